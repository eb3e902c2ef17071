mod benchmark;

use benchmark::run_benchmarks;

fn main() {
    run_benchmarks();
}
