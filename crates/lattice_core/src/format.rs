use serde::{Deserialize, Serialize};

/// Export formats offered by the viewer's export menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    CifSymm,
    Cif,
    Poscar,
    Json,
    Prismatic,
    Mpr,
}

/// Menu labels, in the order the viewer lists them.
pub const EXPORT_FORMAT_LABELS: [&str; 6] = [
    "CIF (Symmetrized)",
    "CIF",
    "POSCAR",
    "JSON",
    "Prismatic",
    "VASP Input Set (MPRelaxSet)",
];

impl ExportFormat {
    pub const ALL: [ExportFormat; 6] = [
        ExportFormat::CifSymm,
        ExportFormat::Cif,
        ExportFormat::Poscar,
        ExportFormat::Json,
        ExportFormat::Prismatic,
        ExportFormat::Mpr,
    ];

    /// Resolves a viewer menu label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "CIF (Symmetrized)" => Some(ExportFormat::CifSymm),
            "CIF" => Some(ExportFormat::Cif),
            "POSCAR" => Some(ExportFormat::Poscar),
            "JSON" => Some(ExportFormat::Json),
            "Prismatic" => Some(ExportFormat::Prismatic),
            "VASP Input Set (MPRelaxSet)" => Some(ExportFormat::Mpr),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::CifSymm => EXPORT_FORMAT_LABELS[0],
            ExportFormat::Cif => EXPORT_FORMAT_LABELS[1],
            ExportFormat::Poscar => EXPORT_FORMAT_LABELS[2],
            ExportFormat::Json => EXPORT_FORMAT_LABELS[3],
            ExportFormat::Prismatic => EXPORT_FORMAT_LABELS[4],
            ExportFormat::Mpr => EXPORT_FORMAT_LABELS[5],
        }
    }

    /// Wire code sent to the export endpoint.
    pub fn code(self) -> &'static str {
        match self {
            ExportFormat::CifSymm => "cif_symm",
            ExportFormat::Cif => "cif",
            ExportFormat::Poscar => "poscar",
            ExportFormat::Json => "json",
            ExportFormat::Prismatic => "prismatic",
            ExportFormat::Mpr => "mpr",
        }
    }

    /// Extension used when the server does not name the file.
    pub fn default_extension(self) -> &'static str {
        match self {
            ExportFormat::Poscar => "txt",
            ExportFormat::CifSymm => "cif",
            other => other.code(),
        }
    }

    pub fn default_filename(self) -> String {
        format!("export.{}", self.default_extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_formats_line_up() {
        for (label, format) in EXPORT_FORMAT_LABELS.iter().zip(ExportFormat::ALL) {
            assert_eq!(ExportFormat::from_label(label), Some(format));
            assert_eq!(format.label(), *label);
        }
    }

    #[test]
    fn serde_uses_wire_codes() {
        for format in ExportFormat::ALL {
            let encoded = serde_json::to_string(&format).unwrap();
            assert_eq!(encoded, format!("\"{}\"", format.code()));
        }
    }

    #[test]
    fn default_filenames() {
        assert_eq!(ExportFormat::Poscar.default_filename(), "export.txt");
        assert_eq!(ExportFormat::CifSymm.default_filename(), "export.cif");
        assert_eq!(ExportFormat::Mpr.default_filename(), "export.mpr");
        assert_eq!(ExportFormat::Json.default_filename(), "export.json");
    }
}
