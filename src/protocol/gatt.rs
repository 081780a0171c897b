//! GATT layout of the hub and the discovery filter.
//!
//! | Characteristic | Service        | UUID                                   | Perms  |
//! |----------------|----------------|----------------------------------------|--------|
//! | Attached IO    | DEVICE_SERVICE | `00001527-1212-efde-1523-785feabcd123` | Notify |
//! | Input Values   | IO_SERVICE     | `00001560-1212-efde-1523-785feabcd123` | Notify |
//! | Input Command  | IO_SERVICE     | `00001563-1212-efde-1523-785feabcd123` | Write  |
//! | Output Command | IO_SERVICE     | `00001565-1212-efde-1523-785feabcd123` | Write  |

pub const DEVICE_SERVICE: u128 = 0x00001523_1212_efde_1523_785feabcd123;
pub const IO_SERVICE: u128 = 0x00004f0e_1212_efde_1523_785feabcd123;
pub const CHAR_ATTACHED_IO: u128 = 0x00001527_1212_efde_1523_785feabcd123;
pub const CHAR_INPUT_VALUES: u128 = 0x00001560_1212_efde_1523_785feabcd123;
pub const CHAR_INPUT_COMMAND: u128 = 0x00001563_1212_efde_1523_785feabcd123;
pub const CHAR_OUTPUT_COMMAND: u128 = 0x00001565_1212_efde_1523_785feabcd123;

/// Payload encoding requested from the session on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Base64,
}

/// Discovery criteria handed to [`Session::connect`](crate::app::ports::Session::connect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    /// A peripheral must advertise at least one of these services.
    pub services: heapless::Vec<u128, 4>,
    /// Services the session must also grant access to once connected.
    pub optional_services: heapless::Vec<u128, 4>,
}

impl DeviceFilter {
    /// Filter matching a WeDo 2.0 hub.
    pub fn wedo2() -> Self {
        let mut services = heapless::Vec::new();
        let mut optional_services = heapless::Vec::new();
        let pushed = services
            .push(DEVICE_SERVICE)
            .and_then(|()| optional_services.push(IO_SERVICE));
        debug_assert!(pushed.is_ok(), "service lists hold four entries");
        Self {
            services,
            optional_services,
        }
    }

    /// Whether a peripheral advertising `advertised` passes the filter.
    pub fn matches(&self, advertised: &[u128]) -> bool {
        self.services.iter().any(|s| advertised.contains(s))
    }
}

/// Render a 128-bit UUID in the canonical hyphenated form.
pub fn uuid_string(uuid: u128) -> String {
    let b = uuid.to_be_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13],
        b[14], b[15]
    )
}
