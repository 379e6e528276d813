fn main() {
    lathe_sim::runtime::run_from_args();
}
