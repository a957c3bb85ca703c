// version.rs - Client version handling for ADT files

use crate::error::{AdtError, Result};

/// The MVER value every supported ADT file carries.
pub const ADT_MVER: u32 = 18;

/// World of Warcraft client generation an ADT file was written for.
///
/// The MVER value never changed between expansions, so the generation decides
/// only version-conditional layouts: where the MCNR padding lives and whether
/// the MCNK header can hold a 64-bit hole mask instead of two offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdtVersion {
    /// Vanilla WoW (1.x)
    Vanilla,
    /// The Burning Crusade (2.x)
    TBC,
    /// Wrath of the Lich King (3.x)
    WotLK,
    /// Cataclysm (4.x)
    Cataclysm,
    /// Mists of Pandaria (5.x)
    MoP,
}

/// Where the 13 trailing bytes of an MCNR chunk are accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalPaddingLayout {
    /// Declared size is 435; the padding follows the chunk.
    Outside,
    /// Declared size is 448 and includes the padding.
    Inside,
}

impl AdtVersion {
    /// Check an MVER value.
    pub fn check_mver(version: u32) -> Result<()> {
        if version == ADT_MVER {
            Ok(())
        } else {
            Err(AdtError::UnsupportedVersion(version))
        }
    }

    /// Guess the client generation from optional root chunks.
    ///
    /// - MH2O or MTXF: WotLK+
    /// - MFBO: TBC+
    /// - none of them: Vanilla
    pub fn detect_from_chunks(has_mfbo: bool, has_mh2o: bool, has_mtxf: bool) -> Self {
        if has_mh2o || has_mtxf {
            AdtVersion::WotLK
        } else if has_mfbo {
            AdtVersion::TBC
        } else {
            AdtVersion::Vanilla
        }
    }

    /// MCNR layout written for new normal chunks.
    pub fn normal_padding(self) -> NormalPaddingLayout {
        if self >= AdtVersion::Cataclysm {
            NormalPaddingLayout::Inside
        } else {
            NormalPaddingLayout::Outside
        }
    }

    /// Whether MCNK flag 0x10000 turns the height/normal offsets into a hole mask.
    pub fn has_high_res_holes(self) -> bool {
        self >= AdtVersion::MoP
    }

    /// Parse a short name as used on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vanilla" | "classic" | "1" => Some(AdtVersion::Vanilla),
            "tbc" | "2" => Some(AdtVersion::TBC),
            "wotlk" | "wrath" | "3" => Some(AdtVersion::WotLK),
            "cata" | "cataclysm" | "4" => Some(AdtVersion::Cataclysm),
            "mop" | "5" => Some(AdtVersion::MoP),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdtVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdtVersion::Vanilla => "Vanilla (1.x)",
            AdtVersion::TBC => "The Burning Crusade (2.x)",
            AdtVersion::WotLK => "Wrath of the Lich King (3.x)",
            AdtVersion::Cataclysm => "Cataclysm (4.x)",
            AdtVersion::MoP => "Mists of Pandaria (5.x)",
        };
        write!(f, "{s}")
    }
}
