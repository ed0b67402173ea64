//! Wacom STU-430 USB IDs and report identifiers.
//!
//! The STU-430 enumerates under Wacom's VID `0x056A` with PID `0x00A4`. It is
//! a monochrome 320×200 signature pad that speaks a vendor feature-report
//! protocol: every configuration command is one feature report with a fixed
//! ID, and pen samples arrive as input reports `0x01` (plain) or `0x34`
//! (with device timestamp and sequence number).
//!
//! Unlike larger STU models the 430 does not answer the capability,
//! information or eSerial feature reports, so nothing here queries them.

use signpad_hid_common::DeviceIdentity;

/// Wacom Co., Ltd. USB vendor ID.
pub const VENDOR_ID: u16 = 0x056A;

/// STU-430 signature pad product ID.
pub const PRODUCT_STU_430: u16 = 0x00A4;

pub const STU_430: DeviceIdentity = DeviceIdentity::new(VENDOR_ID, PRODUCT_STU_430);

/// Returns `true` if the VID/PID pair identifies an STU-430.
pub fn is_stu430(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && pid == PRODUCT_STU_430
}

/// Returns the product name for a known Wacom STU PID, or `None`.
pub fn product_name(pid: u16) -> Option<&'static str> {
    match pid {
        PRODUCT_STU_430 => Some("Wacom STU-430"),
        _ => None,
    }
}

/// Raw report IDs.
pub mod report_ids {
    pub const PEN_DATA: u8 = 0x01;
    pub const WRITING_MODE: u8 = 0x0E;
    pub const CLEAR_SCREEN: u8 = 0x20;
    pub const INK_MODE: u8 = 0x21;
    pub const WRITE_IMAGE_START: u8 = 0x25;
    pub const WRITE_IMAGE_DATA: u8 = 0x26;
    pub const WRITE_IMAGE_END: u8 = 0x27;
    pub const WRITING_AREA: u8 = 0x2A;
    pub const BRIGHTNESS: u8 = 0x2B;
    pub const PEN_COLOR_AND_WIDTH: u8 = 0x2D;
    pub const BACKGROUND_COLOR: u8 = 0x2E;
    pub const PEN_DATA_TIMING: u8 = 0x34;
}

/// Semantic command → report ID mapping. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTable {
    pub pen_data: u8,
    pub writing_mode: u8,
    pub clear_screen: u8,
    pub ink_mode: u8,
    pub write_image_start: u8,
    pub write_image_data: u8,
    pub write_image_end: u8,
    pub writing_area: u8,
    pub brightness: u8,
    pub pen_color_and_width: u8,
    pub background_color: u8,
    pub pen_data_timing: u8,
}

impl CommandTable {
    pub const STU_430: Self = Self {
        pen_data: report_ids::PEN_DATA,
        writing_mode: report_ids::WRITING_MODE,
        clear_screen: report_ids::CLEAR_SCREEN,
        ink_mode: report_ids::INK_MODE,
        write_image_start: report_ids::WRITE_IMAGE_START,
        write_image_data: report_ids::WRITE_IMAGE_DATA,
        write_image_end: report_ids::WRITE_IMAGE_END,
        writing_area: report_ids::WRITING_AREA,
        brightness: report_ids::BRIGHTNESS,
        pen_color_and_width: report_ids::PEN_COLOR_AND_WIDTH,
        background_color: report_ids::BACKGROUND_COLOR,
        pen_data_timing: report_ids::PEN_DATA_TIMING,
    };

    /// Every (name, report ID) pair, in declaration order.
    pub fn entries(&self) -> [(&'static str, u8); 12] {
        [
            ("penData", self.pen_data),
            ("writingMode", self.writing_mode),
            ("clearScreen", self.clear_screen),
            ("inkMode", self.ink_mode),
            ("writeImageStart", self.write_image_start),
            ("writeImageData", self.write_image_data),
            ("writeImageEnd", self.write_image_end),
            ("writingArea", self.writing_area),
            ("brightness", self.brightness),
            ("penColorAndWidth", self.pen_color_and_width),
            ("backgroundColor", self.background_color),
            ("penDataTiming", self.pen_data_timing),
        ]
    }

    pub fn has_distinct_ids(&self) -> bool {
        let mut seen = [false; 256];
        self.entries().iter().all(|&(_, id)| {
            let slot = &mut seen[usize::from(id)];
            !std::mem::replace(slot, true)
        })
    }

    pub fn is_pen_report(&self, report_id: u8) -> bool {
        report_id == self.pen_data || report_id == self.pen_data_timing
    }

    pub fn name_of(&self, report_id: u8) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find_map(|(name, id)| (id == report_id).then_some(name))
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::STU_430
    }
}
