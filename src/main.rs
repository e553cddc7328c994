fn main() {
    cloud_teams::cli::run();
}
