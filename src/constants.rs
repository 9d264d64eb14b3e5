use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GradeLevel {
    Havo4,
    Havo5,
    Vwo4,
    Vwo5,
    Vwo6,
    CrossOverVwo5,
    CrossOverVwo6,
    Vwo3,
    GymAth3,
    Tl3,
    Tl4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Onderbouw,
    Bovenbouw,
    Vmbo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Havo,
    Vwo,
}

const HAVO_SEQUENCE: [GradeLevel; 2] = [GradeLevel::Havo4, GradeLevel::Havo5];
const VWO_SEQUENCE: [GradeLevel; 4] = [
    GradeLevel::Vwo3,
    GradeLevel::Vwo4,
    GradeLevel::Vwo5,
    GradeLevel::Vwo6,
];

impl Track {
    pub fn sequence(self) -> &'static [GradeLevel] {
        match self {
            Track::Havo => &HAVO_SEQUENCE,
            Track::Vwo => &VWO_SEQUENCE,
        }
    }
}

impl GradeLevel {
    /// Ordered by legacy id.
    pub const ALL: [GradeLevel; 11] = [
        GradeLevel::Havo4,
        GradeLevel::Havo5,
        GradeLevel::Vwo4,
        GradeLevel::Vwo5,
        GradeLevel::Vwo6,
        GradeLevel::CrossOverVwo5,
        GradeLevel::CrossOverVwo6,
        GradeLevel::Vwo3,
        GradeLevel::GymAth3,
        GradeLevel::Tl3,
        GradeLevel::Tl4,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.id() == id)
    }

    pub fn id(self) -> i64 {
        match self {
            GradeLevel::Havo4 => 1,
            GradeLevel::Havo5 => 2,
            GradeLevel::Vwo4 => 3,
            GradeLevel::Vwo5 => 4,
            GradeLevel::Vwo6 => 5,
            GradeLevel::CrossOverVwo5 => 6,
            GradeLevel::CrossOverVwo6 => 7,
            GradeLevel::Vwo3 => 16,
            GradeLevel::GymAth3 => 17,
            GradeLevel::Tl3 => 18,
            GradeLevel::Tl4 => 19,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::Havo4 => "4 Havo",
            GradeLevel::Havo5 => "5 Havo",
            GradeLevel::Vwo4 => "4 VWO",
            GradeLevel::Vwo5 => "5 VWO",
            GradeLevel::Vwo6 => "6 VWO",
            GradeLevel::CrossOverVwo5 => "overstappers VWO 5",
            GradeLevel::CrossOverVwo6 => "overstappers VWO 6",
            GradeLevel::Vwo3 => "3 VWO",
            GradeLevel::GymAth3 => "3 Gymnasium/Atheneum",
            GradeLevel::Tl3 => "3 TL",
            GradeLevel::Tl4 => "4 TL",
        }
    }

    /// Used in the exported file name.
    pub fn short_code(self) -> &'static str {
        match self {
            GradeLevel::Havo4 => "H4",
            GradeLevel::Havo5 => "H5",
            GradeLevel::Vwo4 => "V4",
            GradeLevel::Vwo5 => "V5",
            GradeLevel::Vwo6 => "V6",
            GradeLevel::CrossOverVwo5 => "OV5",
            GradeLevel::CrossOverVwo6 => "OV6",
            GradeLevel::Vwo3 => "V3",
            GradeLevel::GymAth3 => "GA3",
            GradeLevel::Tl3 => "TL3",
            GradeLevel::Tl4 => "TL4",
        }
    }

    pub fn sector(self) -> Sector {
        match self {
            GradeLevel::Vwo3 | GradeLevel::GymAth3 => Sector::Onderbouw,
            GradeLevel::Tl3 | GradeLevel::Tl4 => Sector::Vmbo,
            _ => Sector::Bovenbouw,
        }
    }

    pub fn track(self) -> Option<Track> {
        if HAVO_SEQUENCE.contains(&self) {
            Some(Track::Havo)
        } else if VWO_SEQUENCE.contains(&self) {
            Some(Track::Vwo)
        } else {
            None
        }
    }

    pub fn is_year_4(self) -> bool {
        matches!(self, GradeLevel::Havo4 | GradeLevel::Vwo4)
    }

    pub fn is_year_6(self) -> bool {
        matches!(self, GradeLevel::Vwo6)
    }

    pub fn is_cross_over(self) -> bool {
        matches!(self, GradeLevel::CrossOverVwo5 | GradeLevel::CrossOverVwo6)
    }

    /// Prefix shown in front of a predecessor test code in cross-over tables.
    pub fn vwo_prefix(self) -> Option<&'static str> {
        match self {
            GradeLevel::Vwo4 => Some("V4"),
            GradeLevel::Vwo5 => Some("V5"),
            GradeLevel::Vwo6 => Some("V6"),
            _ => None,
        }
    }
}

impl Sector {
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Sector::Onderbouw),
            2 => Some(Sector::Bovenbouw),
            3 => Some(Sector::Vmbo),
            _ => None,
        }
    }

    pub fn grade_levels(self) -> Vec<GradeLevel> {
        GradeLevel::ALL
            .iter()
            .copied()
            .filter(|g| g.sector() == self)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    NoExport,
    ExportAny,
    ExportBySector,
}

impl AccessMode {
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            Some(1) => AccessMode::ExportAny,
            Some(2) => AccessMode::ExportBySector,
            _ => AccessMode::NoExport,
        }
    }
}

/// Exact fractions addressed by weighting codes above 100 (`101` is the first).
pub const FRACTION_LABELS: [&str; 12] = [
    "1/3", "2/3", "1/6", "5/6", "1/8", "3/8", "5/8", "7/8", "1/12", "5/12", "7/12", "11/12",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossOverAction {
    CarryOver,
    Revalue,
    CatchUp,
    AttendWithNextYear,
}

impl CrossOverAction {
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(CrossOverAction::CarryOver),
            2 => Some(CrossOverAction::Revalue),
            3 => Some(CrossOverAction::CatchUp),
            4 => Some(CrossOverAction::AttendWithNextYear),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrossOverAction::CarryOver => "overnemen",
            CrossOverAction::Revalue => "herwaarderen",
            CrossOverAction::CatchUp => "inhalen",
            CrossOverAction::AttendWithNextYear => "meemaken met H5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    #[default]
    NoExport,
    Table,
    RemarkCompletedEarlier,
    RemarkVwo,
    /// NULL or a code outside `0..=3`.
    Unrecognised,
}

impl ExportMode {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("0") => ExportMode::NoExport,
            Some("1") => ExportMode::Table,
            Some("2") => ExportMode::RemarkCompletedEarlier,
            Some("3") => ExportMode::RemarkVwo,
            _ => ExportMode::Unrecognised,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Chronological,
    ByType,
}

impl SortMode {
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            Some(2) => SortMode::ByType,
            _ => SortMode::Chronological,
        }
    }
}

/// Work-kind id meaning "no explicit kind"; its label is never printed.
pub const NO_WORK_KIND_ID: i64 = 12;

pub const MONTHS_NL: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];
