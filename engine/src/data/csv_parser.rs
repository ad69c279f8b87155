use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::{Item, StockBin};
use shared::number_format::NumberFormatSpec;
use std::fs::File;
use std::io::BufReader;

// Loaders for the stock exports the reports run on. Quantities are written
// the way the host displays them, so they go through the locale parser.
pub struct StockCsvParser;

impl StockCsvParser {
    // CSV Header: Item;Warehouse;Actual;Requested;Reserved;Ordered;Projected
    // Example Row: BOLT-10;Main - SP;1.200;0;3.400;0;-2.200
    pub fn load_bins_from_csv(
        file_path: &str,
        spec: &NumberFormatSpec,
        delimiter: u8,
    ) -> Result<Vec<StockBin>> {
        let mut rdr = Self::open(file_path, delimiter)?;
        let headers = rdr.headers()?.clone();

        let mut bins = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let item_code = Self::required(&record, &headers, "Item", line)?;
            let warehouse = Self::required(&record, &headers, "Warehouse", line)?;
            let qty = |name: &str| -> Result<f64> {
                let text = Self::required(&record, &headers, name, line)?;
                spec.parse(text)
                    .map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", name, line, e))
            };

            bins.push(StockBin {
                item_code: item_code.to_string(),
                warehouse: warehouse.to_string(),
                actual_qty: qty("Actual")?,
                indented_qty: qty("Requested")?,
                reserved_qty: qty("Reserved")?,
                ordered_qty: qty("Ordered")?,
                projected_qty: qty("Projected")?,
            });
        }
        tracing::debug!(path = %file_path, count = bins.len(), "Loaded stock bins");
        Ok(bins)
    }

    // CSV Header: Item;Item Name;Image;Stock UOM;Purchase UOM;Conversion Factor
    // Image, Purchase UOM and Conversion Factor may be blank.
    pub fn load_items_from_csv(
        file_path: &str,
        spec: &NumberFormatSpec,
        delimiter: u8,
    ) -> Result<Vec<Item>> {
        let mut rdr = Self::open(file_path, delimiter)?;
        let headers = rdr.headers()?.clone();

        let mut items = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let item_code = Self::required(&record, &headers, "Item", line)?;
            let item_name = Self::required(&record, &headers, "Item Name", line)?;
            let stock_uom = Self::required(&record, &headers, "Stock UOM", line)?;
            let conversion_factor = match Self::optional(&record, &headers, "Conversion Factor") {
                Some(text) => spec
                    .parse(text)
                    .map_err(|e| {
                        anyhow!("Error parsing 'Conversion Factor' at line {}: {}", line, e)
                    })?,
                None => 1.0,
            };

            items.push(Item {
                item_code: item_code.to_string(),
                item_name: item_name.to_string(),
                image: Self::optional(&record, &headers, "Image").map(str::to_string),
                stock_uom: stock_uom.to_string(),
                purchase_uom: Self::optional(&record, &headers, "Purchase UOM").map(str::to_string),
                conversion_factor,
            });
        }
        tracing::debug!(path = %file_path, count = items.len(), "Loaded item master");
        Ok(items)
    }

    // CSV Header: Item;Supplier
    pub fn load_item_suppliers_from_csv(
        file_path: &str,
        delimiter: u8,
    ) -> Result<Vec<(String, String)>> {
        let mut rdr = Self::open(file_path, delimiter)?;
        let headers = rdr.headers()?.clone();

        let mut pairs = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;
            let item_code = Self::required(&record, &headers, "Item", line)?;
            let supplier = Self::required(&record, &headers, "Supplier", line)?;
            pairs.push((item_code.to_string(), supplier.to_string()));
        }
        tracing::debug!(path = %file_path, count = pairs.len(), "Loaded item suppliers");
        Ok(pairs)
    }

    fn open(file_path: &str, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open CSV file '{}'", file_path))?;
        Ok(ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(BufReader::new(file)))
    }

    fn required<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        name: &str,
        line: usize,
    ) -> Result<&'a str> {
        Self::get_field(record, headers, name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("Missing '{}' field in CSV record at line {}", name, line))
    }

    fn optional<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        name: &str,
    ) -> Option<&'a str> {
        Self::get_field(record, headers, name).filter(|value| !value.is_empty())
    }

    // Columns are looked up by header name so exports may reorder them.
    fn get_field<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        name: &str,
    ) -> Option<&'a str> {
        headers
            .iter()
            .position(|header| header == name)
            .and_then(|pos| record.get(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::number_format::{infer_format, NumberFormatSpec};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    fn path(file: &NamedTempFile) -> &str {
        file.path().to_str().unwrap()
    }

    #[test]
    fn test_load_bins_with_comma_decimals() {
        let csv_content = "\
Item;Warehouse;Actual;Requested;Reserved;Ordered;Projected
BOLT-10;Main - SP;1.200;0;3.400;0;-2.200
NUT-M4;Main - SP;12,5;0;0;2;-0,75";
        let tmp_file = create_test_csv(csv_content);
        let bins = StockCsvParser::load_bins_from_csv(
            path(&tmp_file),
            &infer_format("#.###,##"),
            b';',
        )
        .unwrap();

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].item_code, "BOLT-10");
        assert_eq!(bins[0].actual_qty, 1200.0);
        assert_eq!(bins[0].reserved_qty, 3400.0);
        assert_eq!(bins[0].projected_qty, -2200.0);
        assert_eq!(bins[1].actual_qty, 12.5);
        assert_eq!(bins[1].projected_qty, -0.75);
    }

    #[test]
    fn test_load_bins_reordered_columns() {
        let csv_content = "\
Warehouse,Item,Projected,Ordered,Reserved,Requested,Actual
Main - SP,BOLT-10,\"-1,500.5\",0,0,0,0";
        let tmp_file = create_test_csv(csv_content);
        let bins = StockCsvParser::load_bins_from_csv(
            path(&tmp_file),
            &NumberFormatSpec::default(),
            b',',
        )
        .unwrap();
        assert_eq!(bins[0].warehouse, "Main - SP");
        assert_eq!(bins[0].projected_qty, -1500.5);
    }

    #[test]
    fn test_load_bins_invalid_quantity() {
        let csv_content = "\
Item;Warehouse;Actual;Requested;Reserved;Ordered;Projected
BOLT-10;Main - SP;lots;0;0;0;-1";
        let tmp_file = create_test_csv(csv_content);
        let result = StockCsvParser::load_bins_from_csv(
            path(&tmp_file),
            &NumberFormatSpec::default(),
            b';',
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Error parsing 'Actual' at line 2"));
        assert!(message.contains("'lots'"));
    }

    #[test]
    fn test_load_bins_missing_column() {
        let csv_content = "\
Item;Warehouse;Actual;Requested;Reserved;Ordered
BOLT-10;Main - SP;1;0;0;0";
        let tmp_file = create_test_csv(csv_content);
        let result = StockCsvParser::load_bins_from_csv(
            path(&tmp_file),
            &NumberFormatSpec::default(),
            b';',
        );
        assert!(result.unwrap_err().to_string().contains("Missing 'Projected' field"));
    }

    #[test]
    fn test_load_bins_missing_file() {
        let result = StockCsvParser::load_bins_from_csv(
            "no_such_bins.csv",
            &NumberFormatSpec::default(),
            b';',
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file 'no_such_bins.csv'"));
        assert!(err.chain().any(|cause| cause.is::<std::io::Error>()));
    }

    #[test]
    fn test_load_items_blank_optionals() {
        let csv_content = "\
Item;Item Name;Image;Stock UOM;Purchase UOM;Conversion Factor
BOLT-10;Hex bolt M10;/files/bolt.png;Nos;Box;100
NUT-M4;Nut M4;;Nos;;";
        let tmp_file = create_test_csv(csv_content);
        let items = StockCsvParser::load_items_from_csv(
            path(&tmp_file),
            &NumberFormatSpec::default(),
            b';',
        )
        .unwrap();

        assert_eq!(items[0].image.as_deref(), Some("/files/bolt.png"));
        assert_eq!(items[0].purchase_uom.as_deref(), Some("Box"));
        assert_eq!(items[0].conversion_factor, 100.0);
        assert_eq!(items[1].image, None);
        assert_eq!(items[1].purchase_uom, None);
        assert_eq!(items[1].conversion_factor, 1.0);
    }

    #[test]
    fn test_load_item_suppliers() {
        let csv_content = "\
Item;Supplier
BOLT-10;Acme Fasteners
BOLT-10;Bolt Bros";
        let tmp_file = create_test_csv(csv_content);
        let pairs = StockCsvParser::load_item_suppliers_from_csv(path(&tmp_file), b';').unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("BOLT-10".to_string(), "Bolt Bros".to_string()));
    }
}
