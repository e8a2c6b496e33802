//! CSV Data Loader Module
//! Loads the candy CSV with Polars, validates the fixed schema and caches the frame.

use super::schema::{
    required_columns, Attribute, NAME_COL, PERCENT_MAX, PRICE_COL, SUGAR_COL, WIN_COL,
};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Decimal places kept after rescaling percentiles to 0-100.
const SCALED_DECIMALS: u32 = 6;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid value in column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },
}

/// Loads the candy dataset once and hands out the cached frame afterwards.
pub struct CandyLoader {
    file_path: PathBuf,
    df: Option<Arc<DataFrame>>,
}

impl CandyLoader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            df: None,
        }
    }

    /// Load the dataset. The first call reads disk; later calls return the cached frame.
    pub fn load(&mut self) -> Result<Arc<DataFrame>, LoaderError> {
        if let Some(df) = &self.df {
            return Ok(Arc::clone(df));
        }

        let df = Arc::new(read_candy_csv(&self.file_path)?);
        log::info!(
            "Loaded {} candies from {}",
            df.height(),
            self.file_path.display()
        );
        self.df = Some(Arc::clone(&df));
        Ok(df)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Read and normalize a candy CSV.
///
/// Output columns: `competitorname` (String), the nine flags (Boolean) and
/// `sugarpercent`, `pricepercent`, `winpercent` (Float64, all on a 0-100 scale).
pub fn read_candy_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::FileNotFound(path.to_path_buf()));
    }

    let path_str = path.to_string_lossy().to_string();
    let raw = LazyCsvReader::new(&path_str)
        .with_infer_schema_length(Some(10000))
        .with_has_header(true)
        .finish()?
        .collect()?;

    normalize(raw)
}

/// Validate a raw frame against the schema and cast it to the typed layout.
pub fn normalize(raw: DataFrame) -> Result<DataFrame, LoaderError> {
    let present: HashSet<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for name in required_columns() {
        if !present.contains(name) {
            return Err(LoaderError::MissingColumn(name.to_string()));
        }
    }

    let mut exprs = vec![col(NAME_COL).cast(DataType::String)];
    exprs.extend(
        Attribute::ALL
            .iter()
            .map(|a| col(a.column()).cast(DataType::Int64)),
    );
    exprs.extend([
        col(SUGAR_COL).cast(DataType::Float64),
        col(PRICE_COL).cast(DataType::Float64),
        col(WIN_COL).cast(DataType::Float64),
    ]);
    let typed = raw.lazy().select(exprs).collect()?;

    for column in typed.get_columns() {
        if column.null_count() > 0 {
            return Err(LoaderError::InvalidValue {
                column: column.name().to_string(),
                reason: format!("{} empty or unparseable cell(s)", column.null_count()),
            });
        }
    }

    check_unique_names(&typed)?;

    for attr in Attribute::ALL {
        let values = typed.column(attr.column())?.i64()?;
        if let Some(bad) = values.into_iter().flatten().find(|v| *v != 0 && *v != 1) {
            return Err(LoaderError::InvalidValue {
                column: attr.column().to_string(),
                reason: format!("expected 0 or 1, found {bad}"),
            });
        }
    }

    check_range(&typed, SUGAR_COL, 1.0)?;
    check_range(&typed, PRICE_COL, 1.0)?;
    check_range(&typed, WIN_COL, PERCENT_MAX)?;

    let mut exprs = vec![col(NAME_COL)];
    exprs.extend(
        Attribute::ALL
            .iter()
            .map(|a| col(a.column()).cast(DataType::Boolean)),
    );
    // 0.116 * 100 is 11.600000000000001; round off the scaling noise.
    exprs.extend([
        (col(SUGAR_COL) * lit(PERCENT_MAX))
            .round(SCALED_DECIMALS)
            .alias(SUGAR_COL),
        (col(PRICE_COL) * lit(PERCENT_MAX))
            .round(SCALED_DECIMALS)
            .alias(PRICE_COL),
        col(WIN_COL),
    ]);
    let df = typed.lazy().select(exprs).collect()?;
    Ok(df)
}

fn check_unique_names(df: &DataFrame) -> Result<(), LoaderError> {
    let mut seen = HashSet::new();
    for name in df.column(NAME_COL)?.str()?.into_iter().flatten() {
        if !seen.insert(name) {
            return Err(LoaderError::InvalidValue {
                column: NAME_COL.to_string(),
                reason: format!("duplicate candy name '{name}'"),
            });
        }
    }
    Ok(())
}

fn check_range(df: &DataFrame, column: &str, max: f64) -> Result<(), LoaderError> {
    let values = df.column(column)?.f64()?;
    if let Some(bad) = values
        .into_iter()
        .flatten()
        .find(|v| !(0.0..=max).contains(v))
    {
        return Err(LoaderError::InvalidValue {
            column: column.to_string(),
            reason: format!("{bad} is outside 0..={max}"),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::schema::CandyRecord;
    use approx::assert_relative_eq;
    use std::fs;

    pub(crate) fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/candy-sample.csv")
    }

    /// The normalized sample dataset shared by module tests.
    pub(crate) fn sample_frame() -> DataFrame {
        read_candy_csv(&fixture_path()).expect("fixture loads")
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "candy_dash_{}_{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).expect("write temp csv");
        path
    }

    const HEADER: &str = "competitorname,chocolate,fruity,caramel,peanutyalmondy,nougat,crispedricewafer,hard,bar,pluribus,sugarpercent,pricepercent,winpercent";

    #[test]
    fn loads_fixture_with_typed_columns() {
        let df = sample_frame();
        assert_eq!(df.height(), 12);
        assert_eq!(df.column("chocolate").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("winpercent").unwrap().dtype(), &DataType::Float64);

        let records = CandyRecord::from_frame(&df).unwrap();
        let grand = &records[0];
        assert_eq!(grand.name, "100 Grand");
        assert!(grand.has(Attribute::Chocolate));
        assert!(grand.has(Attribute::CrispedRiceWafer));
        assert!(!grand.has(Attribute::Fruity));
        assert_relative_eq!(grand.sugar_percent, 73.2, epsilon = 1e-4);
        assert_relative_eq!(grand.price_percent, 86.0, epsilon = 1e-4);
        assert_relative_eq!(grand.win_percent, 66.971725, epsilon = 1e-6);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_candy_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }

    #[test]
    fn missing_column_is_reported() {
        let path = write_temp(
            "missing_col",
            "competitorname,chocolate\nTwix,1\n",
        );
        let err = read_candy_csv(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "fruity"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn non_binary_flag_is_rejected() {
        let path = write_temp(
            "bad_flag",
            &format!("{HEADER}\nTwix,2,0,1,0,0,1,0,1,0,0.546,0.906,81.64\n"),
        );
        let err = read_candy_csv(&path).unwrap_err();
        assert!(
            matches!(err, LoaderError::InvalidValue { ref column, .. } if column == "chocolate")
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        let path = write_temp(
            "bad_range",
            &format!("{HEADER}\nTwix,1,0,1,0,0,1,0,1,0,54.6,0.906,81.64\n"),
        );
        let err = read_candy_csv(&path).unwrap_err();
        assert!(
            matches!(err, LoaderError::InvalidValue { ref column, .. } if column == "sugarpercent")
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let row = "Twix,1,0,1,0,0,1,0,1,0,0.546,0.906,81.64";
        let path = write_temp("dupes", &format!("{HEADER}\n{row}\n{row}\n"));
        let err = read_candy_csv(&path).unwrap_err();
        assert!(
            matches!(err, LoaderError::InvalidValue { ref column, .. } if column == "competitorname")
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn scaled_percentiles_keep_source_precision() {
        let records = CandyRecord::from_frame(&sample_frame()).unwrap();
        let twix = records.iter().find(|r| r.name == "Twix").unwrap();
        assert_eq!(twix.price_percent, 90.6);
        assert_eq!(twix.sugar_percent, 54.6);
        let dime = records.iter().find(|r| r.name == "One dime").unwrap();
        assert_eq!(dime.price_percent, 11.6);
        assert_eq!(dime.sugar_percent, 1.1);
    }

    #[test]
    fn blank_cell_is_rejected() {
        let path = write_temp(
            "blank_cell",
            &format!("{HEADER}\nTwix,1,0,1,0,0,1,0,1,0,0.546,0.906,\nKit Kat,1,0,0,0,0,1,0,1,0,0.313,0.511,76.7686\n"),
        );
        let err = read_candy_csv(&path).unwrap_err();
        assert!(
            matches!(err, LoaderError::InvalidValue { ref column, .. } if column == "winpercent")
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_csv_is_a_csv_error() {
        let path = write_temp(
            "ragged",
            &format!("{HEADER}\nTwix,1,0,1,0,0,1,0,1,0,0.546,0.906,81.64,extra,fields\n"),
        );
        let err = read_candy_csv(&path).unwrap_err();
        assert!(matches!(err, LoaderError::CsvError(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn loader_caches_after_first_read() {
        let path = write_temp(
            "cache",
            &format!("{HEADER}\nTwix,1,0,1,0,0,1,0,1,0,0.546,0.906,81.64\n"),
        );
        let mut loader = CandyLoader::new(&path);
        assert_eq!(loader.file_path(), path.as_path());
        let first = loader.load().unwrap();

        fs::remove_file(&path).unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.height(), 1);
    }
}
