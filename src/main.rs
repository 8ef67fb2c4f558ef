fn main() {
    projgraph::cli::run();
}
