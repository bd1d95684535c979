fn main() {
    if let Err(err) = csv_timeseries::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
