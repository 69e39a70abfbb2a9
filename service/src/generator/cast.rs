use super::error::GeneratorError;

/// Excel has a maximum of 16,384 columns (2^14).
const MAX_EXCEL_COLUMNS: usize = 16_384;

/// Safely cast a column position to an Excel column index.
pub(super) fn usize_to_u16_column(value: usize) -> Result<u16, GeneratorError> {
    if value >= MAX_EXCEL_COLUMNS {
        return Err(GeneratorError::Validation(format!(
            "Too many columns for Excel: {} (max: {MAX_EXCEL_COLUMNS})",
            value + 1
        )));
    }

    u16::try_from(value)
        .map_err(|_| GeneratorError::Generation(format!("Column index {value} cannot fit in u16")))
}

/// Convert a 0-based column index to its letter reference (`0` -> `A`, `26` -> `AA`).
pub(super) fn column_letter(column: u16) -> String {
    let mut remaining = u32::from(column) + 1;
    let mut letters = Vec::new();

    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(char::from_u32(u32::from(b'A') + offset).unwrap_or('A'));
        remaining = (remaining - 1) / 26;
    }

    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
        assert_eq!(column_letter(16_383), "XFD");
    }

    #[test]
    fn test_column_cast_limits() {
        assert_eq!(usize_to_u16_column(3).unwrap(), 3);
        assert!(usize_to_u16_column(16_384).is_err());
    }
}
