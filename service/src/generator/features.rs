use bitflags::bitflags;

bitflags! {
    /// Workbook generation features to enable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GeneratorFeatures: u8 {
        /// Emit native input constraints for each column.
        const ADD_VALIDATION = 0b0001;
        /// Pre-fill the first data row with column defaults.
        const PREFILL_DEFAULTS = 0b0010;
        /// Freeze the header row.
        const FREEZE_HEADER = 0b0100;
        /// Attach notes describing constraints that have no native rule.
        const CONSTRAINT_NOTES = 0b1000;

        /// Everything a fillable template needs (default).
        const STANDARD = Self::ADD_VALIDATION.bits()
                       | Self::PREFILL_DEFAULTS.bits()
                       | Self::CONSTRAINT_NOTES.bits();

        /// All features enabled.
        const ALL = Self::STANDARD.bits() | Self::FREEZE_HEADER.bits();

        /// Header row only.
        const NONE = 0b0000;
    }
}
