//! Create, read, and write a row-based [`Table`] of delimited text.

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A row-based [`Table`] of generic data.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// Optional file path for where the table was read from.
    pub path: Option<PathBuf>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T> {
    /// Returns a new row-based [`Table`] with empty headers and rows.
    ///
    /// ## Examples
    ///
    /// Let the compiler figure out the type from subsequent commands.
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    /// # assert_eq!(table.rows, vec![vec!["A", "B", "C"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Returns true if the [`Table`] has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Table<T>
where
    T: Clone + Debug + Display + PartialEq,
{
    /// Add a new row to the table.
    ///
    /// The row must be as wide as the headers (or the existing rows, if there are no headers).
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_row(["D", "E", "F"])?;
    /// assert!(table.add_row(["G"]).is_err());
    /// # assert_eq!(table.rows, [["A", "B", "C"], ["D", "E", "F"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    /// | D | E | F |
    pub fn add_row<I>(&mut self, row: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let row = row.into_iter().collect_vec();
        let expected = match (self.headers.is_empty(), self.rows.first()) {
            (false, _) => Some(self.headers.len()),
            (true, Some(first)) => Some(first.len()),
            (true, None) => None,
        };
        if let Some(ex) = expected {
            let new = row.len();
            if ex != new {
                return Err(eyre!("New row size ({new}) does not match existing table ({ex})."));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the [`Table`] value under a particular header and row index.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// assert_eq!(table.get(&"2", 0)?, &"B");
    /// assert!(table.get(&"4", 0).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get(&self, header: &T, row: usize) -> Result<&T, Report> {
        let header_i = self.get_header_index(header)?;
        let row = self.get_row(row)?;
        row.get(header_i).wrap_err_with(|| eyre!("Row is missing column {header}."))
    }

    /// Returns the column index (0-based) of the header in the [`Table`].
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    ///
    /// assert_eq!(table.get_header_index(&"1")?, 0);
    /// assert_eq!(table.get_header_index(&"3")?, 2);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_header_index(&self, header: &T) -> Result<usize, Report> {
        let pos =
            self.headers.iter().position(|h| h == header).ok_or_else(|| {
                eyre!("Column '{header}' was not found in table: {:?}.", self.path)
            })?;

        Ok(pos)
    }

    /// Return a row of [`Table`] values from a row index.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// assert_eq!(table.get_row(0)?, ["A", "B", "C"]);
    /// assert!(table.get_row(1).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_row(&self, i: usize) -> Result<&[T], Report> {
        self.rows.get(i).map(|row| row.as_slice()).ok_or_else(|| {
            eyre!("Row ({i}) does not exist in the table.")
        })
    }

    /// Write [`Table`] to a delimited text file.
    ///
    /// If `delim` is [`None`], the delimiter is chosen from the file extension with [`get_delimiter`].
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = isomut_table::Table::new();
    /// table.headers = vec!["marker", "annotation"];
    /// table.add_row(["M1", "p.Leu5Val,rpoB,missense,locus123"])?;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("table.csv");
    /// table.write(&path, None)?;
    ///
    /// // quoting keeps delimiters inside cells intact
    /// let observed = isomut_table::Table::read(&path, None)?;
    /// assert_eq!(observed.rows, [["M1", "p.Leu5Val,rpoB,missense,locus123"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P, delim: Option<char>) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = match delim {
            Some(c) => c,
            None => get_delimiter(path)?,
        };
        let delim = u8::try_from(delim)
            .wrap_err_with(|| eyre!("Delimiter must be a single byte: {delim:?}"))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delim)
            .from_path(path)
            .wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;

        writer
            .write_record(self.headers.iter().map(|h| h.to_string()))
            .wrap_err_with(|| eyre!("Unable to write table headers: {path:?}"))?;

        self.rows.iter().try_for_each(|row| {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .wrap_err_with(|| eyre!("Unable to write table rows: {path:?}"))
        })?;

        writer.flush().wrap_err_with(|| eyre!("Unable to flush table: {path:?}"))?;
        Ok(())
    }
}

impl Table<String> {
    /// Read a delimited text file into a [`Table`].
    ///
    /// The first line holds the headers. Surrounding whitespace is trimmed from every cell.
    /// Rows are not required to be as wide as the headers, callers decide how to handle ragged rows.
    ///
    /// ## Arguments
    ///
    /// - `path` - File path.
    /// - `delim` - Optional delimiter. Otherwise, it will be identified from the file extension.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::io::Write;
    ///
    /// let mut file = tempfile::Builder::new().suffix(".tsv").tempfile()?;
    /// writeln!(file, "1\t2\t3\nA\tB\tC")?;
    /// let table = isomut_table::Table::read(&file.path(), None)?;
    /// assert_eq!(table.headers, ["1", "2", "3"]);
    /// assert_eq!(table.rows, [["A", "B", "C"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn read<P>(path: &P, delim: Option<char>) -> Result<Table<String>, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = match delim {
            Some(c) => c,
            None => get_delimiter(path)?,
        };
        let file =
            std::fs::File::open(path).wrap_err_with(|| eyre!("Failed to read file: {path:?}"))?;
        let mut table = Table::from_reader(file, delim)
            .wrap_err_with(|| eyre!("Failed to parse table: {path:?}"))?;
        table.path = Some(path.as_ref().to_path_buf());
        Ok(table)
    }

    /// Parse delimited text from a reader into a [`Table`].
    ///
    /// ```
    /// let text = "id,M1\nroot,A\n";
    /// let table = isomut_table::Table::from_reader(text.as_bytes(), ',')?;
    /// assert_eq!(table.get(&"M1".to_string(), 0)?, "A");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn from_reader<R>(reader: R, delim: char) -> Result<Table<String>, Report>
    where
        R: Read,
    {
        let delim = u8::try_from(delim)
            .wrap_err_with(|| eyre!("Delimiter must be a single byte: {delim:?}"))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delim)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Table::new();
        table.headers =
            reader.headers().wrap_err("Failed to parse table headers.")?.iter().map(String::from).collect();

        reader.records().enumerate().try_for_each(|(i, record)| {
            let record = record.wrap_err_with(|| eyre!("Failed to parse table row {i}."))?;
            table.rows.push(record.iter().map(String::from).collect());
            Ok::<(), Report>(())
        })?;

        Ok(table)
    }
}

/// Get delimiter based on file extension.
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// Note that `.txt` is assumed to be tab-delimited!
///
/// ```rust
/// use isomut_table::get_delimiter;
///
/// assert_eq!(get_delimiter(&"file.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"file.csv")?, ',');
/// assert_eq!(get_delimiter(&"file.txt")?, '\t');
/// assert!(get_delimiter(&"file").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err_with(|| eyre!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err_with(|| eyre!("Failed to convert file extension to str: {path:?}"))?;
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => {
            Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt"))
        }
    }
}
