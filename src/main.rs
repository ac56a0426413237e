fn main() {
    cribbdle::cli::run();
}
