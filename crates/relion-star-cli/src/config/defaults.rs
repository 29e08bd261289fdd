pub struct DefaultsConfig {
    pub float_precision: usize,
    pub column_numbers: bool,
    pub align_columns: bool,
    pub header_comment: Option<String>,
    pub relion_types: bool,
    pub max_range: f64,
    pub min_particles: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            float_precision: 6,
            column_numbers: true,
            align_columns: true,
            header_comment: Some("version 30001".to_string()),
            relion_types: true,
            max_range: 1000.0,
            min_particles: 10,
        }
    }
}
