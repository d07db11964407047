//! Core 5G types: PLMN, TAI, S-NSSAI and the NR user location.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public Land Mobile Network identifier.
///
/// The `long_mnc` field indicates whether the MNC uses 3 digits (true) or 2 digits (false).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (3 digits, range 0-999)
    pub mcc: u16,
    /// Mobile Network Code (2-3 digits, range 0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits, false if 2 digits
    #[serde(default)]
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN with the given MCC and MNC.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Returns true if this PLMN has valid values set.
    pub fn has_value(&self) -> bool {
        self.mcc > 0 || self.mnc > 0
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "Plmn({:03}-{:03})", self.mcc, self.mnc)
        } else {
            write!(f, "Plmn({:03}-{:02})", self.mcc, self.mnc)
        }
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "{:03}{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}{:02}", self.mcc, self.mnc)
        }
    }
}

/// Tracking Area Identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tai {
    /// Public Land Mobile Network identifier
    pub plmn: Plmn,
    /// Tracking Area Code (24-bit, range 0-16777215)
    pub tac: u32,
}

impl Tai {
    /// Creates a new TAI with the given PLMN and TAC.
    pub const fn new(plmn: Plmn, tac: u32) -> Self {
        Self { plmn, tac }
    }
}

impl fmt::Debug for Tai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tai({:?}, tac={})", self.plmn, self.tac)
    }
}

impl fmt::Display for Tai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.plmn, self.tac)
    }
}

/// Single Network Slice Selection Assistance Information (S-NSSAI)
///
/// S-NSSAI identifies a network slice and consists of:
/// - SST (Slice/Service Type): 8-bit value identifying the slice type
/// - SD (Slice Differentiator): Optional 24-bit value for further differentiation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SNssai {
    /// Slice/Service Type (8-bit)
    pub sst: u8,
    /// Slice Differentiator (optional 24-bit value)
    #[serde(default)]
    pub sd: Option<[u8; 3]>,
}

impl SNssai {
    /// Creates a new S-NSSAI with only SST (no SD).
    pub const fn new(sst: u8) -> Self {
        Self { sst, sd: None }
    }

    /// Creates a new S-NSSAI with SST and SD from a u32 value.
    ///
    /// Only the lower 24 bits of `sd` are used.
    pub const fn with_sd_u32(sst: u8, sd: u32) -> Self {
        Self {
            sst,
            sd: Some([
                ((sd >> 16) & 0xFF) as u8,
                ((sd >> 8) & 0xFF) as u8,
                (sd & 0xFF) as u8,
            ]),
        }
    }

    /// Returns the SD as a u32 value, or None if SD is not set.
    pub fn sd_as_u32(&self) -> Option<u32> {
        self.sd.map(|sd| ((sd[0] as u32) << 16) | ((sd[1] as u32) << 8) | (sd[2] as u32))
    }

    /// Encodes the S-NSSAI contents as carried in NAS (TS 24.501 9.11.2.8).
    ///
    /// Returns 1 byte if SD is None, 4 bytes if SD is present.
    pub fn encode(&self) -> Vec<u8> {
        match self.sd {
            Some(sd) => vec![self.sst, sd[0], sd[1], sd[2]],
            None => vec![self.sst],
        }
    }

    /// Decodes an S-NSSAI from its NAS contents.
    ///
    /// Accepts the 1, 2, 4, 5 and 8 byte forms. The mapped HPLMN SST and SD
    /// carried by the 2, 5 and 8 byte forms are ignored. Returns None for any
    /// other length.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [sst] | [sst, _] => Some(Self::new(sst)),
            [sst, sd0, sd1, sd2]
            | [sst, sd0, sd1, sd2, _]
            | [sst, sd0, sd1, sd2, _, _, _, _] => Some(Self {
                sst,
                sd: Some([sd0, sd1, sd2]),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for SNssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd_as_u32() {
            Some(sd) => write!(f, "SNssai(sst={}, sd={:06X})", self.sst, sd),
            None => write!(f, "SNssai(sst={})", self.sst),
        }
    }
}

impl fmt::Display for SNssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd_as_u32() {
            Some(sd) => write!(f, "{}-{:06X}", self.sst, sd),
            None => write!(f, "{}", self.sst),
        }
    }
}

/// NR Cell Global Identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ncgi {
    /// PLMN of the serving cell
    pub plmn: Plmn,
    /// NR Cell Identity (36-bit)
    pub nr_cell_id: u64,
}

impl Ncgi {
    /// Creates a new NCGI.
    pub const fn new(plmn: Plmn, nr_cell_id: u64) -> Self {
        Self {
            plmn,
            nr_cell_id: nr_cell_id & 0xF_FFFF_FFFF,
        }
    }
}

/// NR user location of a UE as last reported by the RAN.
///
/// All fields are plain values: cloning a location yields an independent
/// snapshot that later updates to the source cannot reach.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NrLocation {
    /// Tracking area the UE is camped on
    pub tai: Tai,
    /// Serving NR cell
    pub ncgi: Ncgi,
    /// Age of the location information in minutes, if reported
    #[serde(default)]
    pub age_of_location_information: Option<u32>,
}

impl NrLocation {
    /// Creates a location from a TAI and NCGI.
    pub fn new(tai: Tai, ncgi: Ncgi) -> Self {
        Self {
            tai,
            ncgi,
            age_of_location_information: None,
        }
    }
}

impl fmt::Display for NrLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tai={} nci={:09X}", self.tai, self.ncgi.nr_cell_id)
    }
}
