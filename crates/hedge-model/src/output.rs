//! Output records and CSV writer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const HEADER: [&str; 9] = [
    "technique",
    "app",
    "func",
    "end_timestamp",
    "response_time",
    "system_load",
    "service_time",
    "copy_service_time",
    "delay",
];

/// One output row: a request processed under a single technique.
#[derive(Debug, Clone, PartialEq)]
pub struct HedgeOutcome {
    pub technique: String,
    pub app: String,
    pub func: String,
    pub end_timestamp: f64,
    pub response_time: f64,
    pub system_load: f64,
    pub service_time: f64,
    pub copy_service_time: f64,
    pub delay: f64,
}

impl HedgeOutcome {
    /// Fields in [`HEADER`] order. Numbers use the shortest representation that round-trips.
    pub fn to_record(&self) -> [String; 9] {
        [
            self.technique.clone(),
            self.app.clone(),
            self.func.clone(),
            self.end_timestamp.to_string(),
            self.response_time.to_string(),
            self.system_load.to_string(),
            self.service_time.to_string(),
            self.copy_service_time.to_string(),
            self.delay.to_string(),
        ]
    }
}

/// Writes the header followed by all rows.
pub fn write_records<W: Write>(writer: W, rows: &[HedgeOutcome]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes rows into `dir/file_name`, creating the directory if needed. Returns the file path.
pub fn write_csv(dir: &Path, file_name: &str, rows: &[HedgeOutcome]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    write_records(File::create(&path)?, rows)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_records() {
        let rows = vec![HedgeOutcome {
            technique: "baseline".to_string(),
            app: "lognormal_poisson-app".to_string(),
            func: "f1".to_string(),
            end_timestamp: 12.5,
            response_time: 2.5,
            system_load: 2.5,
            service_time: 2.5,
            copy_service_time: 0.,
            delay: 0.,
        }];
        let mut buf = Vec::new();
        write_records(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "technique,app,func,end_timestamp,response_time,system_load,service_time,copy_service_time,delay\n\
             baseline,lognormal_poisson-app,f1,12.5,2.5,2.5,2.5,0,0\n"
        );
    }
}
