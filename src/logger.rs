use std::io::Write;

pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level().as_str().to_lowercase(), record.args())
        })
        .init();
}
