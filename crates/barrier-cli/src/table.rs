use crate::error::{CliError, Result};
use anyhow::{Context, anyhow, bail};
use barrierforest::core::models::conformation::Conformation;
use barrierforest::core::models::model::Model;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reads a recorded trajectory: one `energy,angle_1,...,angle_k` row per model.
///
/// Lines starting with `#` are comments. Every row must carry the same number of angles, and
/// each model gets its row index (among data rows) as id.
pub fn read_trajectory(path: &Path) -> Result<Vec<Conformation>> {
    info!("Loading trajectory from {:?}", path);
    let file = File::open(path)?;
    let models = parse_trajectory(file).map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        models = models.len(),
        angles = models.first().map_or(0, |model| model.size()),
        "Trajectory loaded."
    );
    Ok(models)
}

fn parse_trajectory<R: Read>(source: R) -> anyhow::Result<Vec<Conformation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut models = Vec::new();
    let mut width = None;
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("row {}", row + 1))?;
        let values = record
            .iter()
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("row {}: '{}' is not a number", row + 1, field))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;

        let Some((&energy, angles)) = values.split_first() else {
            bail!("row {} is empty", row + 1);
        };
        if angles.is_empty() {
            bail!("row {} has an energy but no angles", row + 1);
        }
        match width {
            None => width = Some(angles.len()),
            Some(expected) if expected != angles.len() => {
                bail!(
                    "row {} has {} angles, expected {}",
                    row + 1,
                    angles.len(),
                    expected
                );
            }
            Some(_) => {}
        }
        models.push(Conformation::recorded(angles.to_vec(), energy).with_id(row));
    }

    if models.is_empty() {
        return Err(anyhow!("the trajectory contains no models"));
    }
    Ok(models)
}

/// Writes models as `energy,angle_1,...,angle_k` rows.
pub fn write_models<W: Write, M: Model>(sink: W, models: &[M]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(sink);
    for model in models {
        let mut row = Vec::with_capacity(model.size() + 1);
        row.push(model.evaluate().to_string());
        row.extend((0..model.size()).map(|i| model.angle(i).to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_recorded_conformations_with_row_ids() {
        let table = "# energy, phi, psi\n-1.5, 60, -120\n0.25,  -60.5, 180\n";
        let models = parse_trajectory(table.as_bytes()).unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].evaluate(), -1.5);
        assert_eq!(models[1].angle(0), -60.5);
        assert_eq!(models[1].id(), Some(1));
        assert!(models.iter().all(Conformation::is_recorded));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        assert!(parse_trajectory("1.0\n".as_bytes()).is_err());
        assert!(parse_trajectory("1.0, x\n".as_bytes()).is_err());
        assert!(parse_trajectory("# only comments\n".as_bytes()).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = parse_trajectory("1.0, 10, 20\n2.0, 30\n".as_bytes()).unwrap_err();
        assert!(error.to_string().contains("row 2"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = read_trajectory(Path::new("/nonexistent/trajectory.csv"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn written_rows_read_back_as_the_same_models() {
        let models = vec![
            Conformation::recorded(vec![10.0, -20.0], 1.25),
            Conformation::recorded(vec![170.0, 5.5], -3.0),
        ];
        let mut buffer = Vec::new();
        write_models(&mut buffer, &models).unwrap();

        assert_eq!(
            String::from_utf8(buffer.clone()).unwrap(),
            "1.25,10,-20\n-3,170,5.5\n"
        );
        let parsed = parse_trajectory(buffer.as_slice()).unwrap();
        assert_eq!(parsed[1].angle(1), 5.5);
    }
}
