use env_logger::{Builder, Target};
use chrono::Local;
use std::io::Write;
use std::fs::OpenOptions;

pub type LevelFilter = log::LevelFilter;

pub struct LogConfig {
    pub log_file: String,
    pub log_level: LevelFilter,
}
impl LogConfig {
    pub fn new(log_file: String, log_level: LevelFilter) -> Self {
        Self { log_file, log_level }
    }
}

/// Initialize the global logger: timestamped records to stdout and an
/// append-mode log file. Call once at startup.
pub fn init(config: &LogConfig) -> std::io::Result<()> {
    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // Writer that tees to both stdout and the log file
    let multi_writer = MultiWriter {
        writers: vec![
            Box::new(std::io::stdout()),
            Box::new(file),
        ],
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args())
        })
        .filter(None, config.log_level)
        .target(Target::Pipe(Box::new(multi_writer)))
        .init();

    Ok(())
}

struct MultiWriter {
    writers: Vec<Box<dyn Write + Send + Sync>>,
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}
