//! Constants of the firmware

/// Panel width in pixels
pub const PIXEL_HORIZONTAL: usize = 240;
/// Panel height in pixels
pub const PIXEL_VERTICAL: usize = 240;
/// Pixels per frame
pub const PIXEL_COUNT: usize = PIXEL_HORIZONTAL * PIXEL_VERTICAL;
/// One stored image row: 24-bit BGR
pub const ROW_BYTES: usize = PIXEL_HORIZONTAL * 3;
/// Filename extension of displayable images
pub const IMAGE_EXTENSION: &str = "bmp";
/// Depth of the received-command ring
pub const COMMAND_QUEUE_SIZE: usize = 64;
/// Received commands executed per loop iteration
pub const COMMAND_TIMESLICE: usize = 8;
/// Depth of the received-pixel ring: one row
pub const PIXEL_QUEUE_SIZE: usize = ROW_BYTES;
/// Pixels drawn per loop iteration
pub const PIXEL_TIMESLICE: usize = PIXEL_HORIZONTAL;
/// Depth of the joystick command ring
pub const JOYSTICK_QUEUE_SIZE: usize = 8;
/// Raw bytes of one outgoing frame
pub const FRAME_DATA_BYTES: usize = PIXEL_COUNT * 3;
/// Transmit queue: one frame plus a header byte per 64-byte block
pub const TX_QUEUE_DEPTH: usize = FRAME_DATA_BYTES + FRAME_DATA_BYTES / 64;
