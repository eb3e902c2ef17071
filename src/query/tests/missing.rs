use super::*;

fn last_price(name: &str, missing: MissingPolicy) -> AggField {
    AggField::new(name, Method::Last, "price", missing)
}

fn lag(field: &str, periods: usize) -> MissingPolicy {
    MissingPolicy::Lag {
        field: field.to_string(),
        periods,
    }
}

fn ticked(decl: AggregationDecl) -> Store {
    let store = store_with(decl);
    for (time, price, vol) in crate::storage::tests::msft_ticks() {
        store.append_datum(MSFT, time, trade(price, vol)).unwrap();
    }
    store
}

#[test]
fn test_empty_sum_is_missing_not_zero() {
    let store = ticked(decl_with(
        TimeDelta::minutes(1),
        vec![
            last_price("close", lag("close", 1)),
            AggField::new("vol", Method::Sum, "vol", lag("vol", 2)),
        ],
    ));

    // 0:05 has no ticks and nothing two periods back to fall back on.
    let result = store.aggregate("stockInfo", MSFT, at(0, 4, 0), at(0, 6, 0)).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.times().first(), Some(&at(0, 4, 0)));
    assert_eq!(column_values(&result, "vol"), integers(&[10]));
}

#[test]
fn test_use_field_chain_ignores_declaration_order() {
    let store = ticked(decl_with(
        TimeDelta::minutes(1),
        vec![
            last_price("c", MissingPolicy::UseField("b".into())),
            last_price("b", MissingPolicy::UseField("a".into())),
            last_price("a", lag("a", 1)),
        ],
    ));

    let result = store.aggregate("stockInfo", MSFT, at(0, 0, 0), at(0, 3, 0)).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.row(2).unwrap(), fixed(&[4_900_000; 3]));
}

#[test]
fn test_lag_reaches_back_n_periods() {
    let store = ticked(decl_with(TimeDelta::minutes(1), vec![last_price("close", lag("close", 2))]));

    let result = store.aggregate("stockInfo", MSFT, at(0, 0, 0), at(0, 4, 0)).unwrap();
    assert_eq!(
        column_values(&result, "close"),
        fixed(&[4_500_000, 4_900_000, 4_500_000, 4_900_000])
    );
}

#[test]
fn test_unresolvable_lag_drops_period() {
    let store = ticked(decl_with(TimeDelta::minutes(1), vec![last_price("close", lag("close", 2))]));

    let result = store.aggregate("stockInfo", MSFT, at(0, 2, 0), at(0, 6, 0)).unwrap();
    assert_eq!(result.times().iter().copied().collect::<Vec<_>>(), vec![at(0, 4, 0)]);
    assert_eq!(column_values(&result, "close"), fixed(&[4_890_000]));
}

#[test]
fn test_cycle_fails_at_aggregate_time() {
    let store = ticked(decl_with(
        TimeDelta::minutes(1),
        vec![
            last_price("low", MissingPolicy::UseField("high".into())),
            last_price("high", MissingPolicy::UseField("low".into())),
        ],
    ));

    assert!(matches!(
        store.aggregate("stockInfo", MSFT, at(0, 0, 0), at(0, 5, 0)),
        Err(Error::DerivationError(_))
    ));
}

#[test]
fn test_present_values_are_not_overwritten() {
    let store = msft_store();
    let result = store.aggregate("stockInfo", MSFT, at(0, 0, 0), at(0, 30, 0)).unwrap();

    assert_eq!(column_values(&result, "low"), fixed(&[4_200_000, 4_890_000]));
    assert_eq!(column_values(&result, "cVol"), integers(&[139, 139]));
}

#[test]
fn test_sum_overflow_is_an_error() {
    let store = store_with(decl_with(
        TimeDelta::minutes(1),
        vec![AggField::new("vol", Method::Sum, "vol", lag("vol", 1))],
    ));
    store.append_datum(MSFT, at(0, 0, 0), trade(1, i64::MAX)).unwrap();
    store.append_datum(MSFT, at(0, 0, 30), trade(1, 1)).unwrap();

    assert!(matches!(
        store.aggregate("stockInfo", MSFT, at(0, 0, 0), at(0, 1, 0)),
        Err(Error::Overflow(_))
    ));
    // Starting after the large row leaves a valid sum.
    let result = store.aggregate("stockInfo", MSFT, at(0, 0, 10), at(0, 1, 0)).unwrap();
    assert_eq!(column_values(&result, "vol"), integers(&[1]));
}
