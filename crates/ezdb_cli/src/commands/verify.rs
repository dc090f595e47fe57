//! Verify command implementation.

use super::{open_existing, CommandResult};
use ezdb_core::VerifyReport;
use std::path::Path;

/// Runs the verify command.
pub fn run(path: &Path) -> CommandResult {
    println!("Verifying database at {:?}", path);
    println!();

    let db = open_existing(path)?;
    let report = db.verify()?;
    print_result(&report);

    println!();
    if report.is_clean() {
        println!("✓ Database verification passed");
        Ok(())
    } else {
        println!("✗ Database verification failed");
        Err("Verification failed".into())
    }
}

fn print_result(report: &VerifyReport) {
    println!(
        "  Manifest entries: {}, missing records: {}, orphaned records: {}",
        report.entries,
        report.missing.len(),
        report.orphans.len()
    );
    for entry in &report.missing {
        println!("    ERROR: key '{}' has no record file {}.xml", entry.name, entry.src);
    }
    for orphan in &report.orphans {
        println!("    WARNING: record file {}.xml is not in the manifest", orphan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezdb_core::Database;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn clean_database_passes() {
        let temp = tempdir().unwrap();
        let mut db = Database::new(temp.path());
        db.add_key("a").unwrap();
        db.save().unwrap();

        assert!(run(temp.path()).is_ok());
    }

    #[test]
    fn missing_record_fails() {
        let temp = tempdir().unwrap();
        let mut db = Database::new(temp.path());
        db.add_key("a").unwrap();
        db.save().unwrap();

        let id = db.get_key("a").unwrap().id().cloned().unwrap();
        fs::remove_file(db.dir().key_path(&id)).unwrap();
        assert!(run(temp.path()).is_err());
    }
}
