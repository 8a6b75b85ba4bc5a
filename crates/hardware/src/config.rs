//! Configuration system for the emulator.
//!
//! This module defines the configuration structure used to parameterize the
//! emulated machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (core count, memory map,
//!    prefetch depth).
//! 2. **Structure:** A serde-deserializable config so the CLI can accept a
//!    JSON machine description, with every field optional.

use serde::Deserialize;

/// Default configuration constants for the emulated machine.
mod defaults {
    /// Number of cores started by default.
    pub const CORES: u32 = 2;

    /// Depth of each core's instruction prefetch buffer, in words.
    ///
    /// One bus transaction fetches this many instructions ahead.
    pub const PREFETCH_DEPTH: u32 = 4;

    /// Base address of main RAM.
    pub const RAM_BASE: u32 = 0x2000_0000;

    /// Total size of main RAM (4 MiB).
    pub const RAM_SIZE: u32 = 4 * 1024 * 1024;

    /// Base address of the boot ROM.
    ///
    /// The trap vector points here; the ROM is read-only and executable.
    pub const ROM_BASE: u32 = 0x1000_0000;

    /// Size of the boot ROM (4 KiB).
    pub const ROM_SIZE: u32 = 4096;

    /// Per-core stack size carved from the top of RAM (64 KiB).
    pub const STACK_SIZE: u32 = 64 * 1024;

    /// Base address of the framebuffer when video is enabled.
    pub const VIDEO_BASE: u32 = 0x3000_0000;

    /// Framebuffer width in bytes per scanline.
    pub const VIDEO_WIDTH: u32 = 320;

    /// Framebuffer height in scanlines.
    pub const VIDEO_HEIGHT: u32 = 200;

    pub fn cores() -> u32 {
        CORES
    }
    pub fn prefetch_depth() -> u32 {
        PREFETCH_DEPTH
    }
    pub fn ram_base() -> u32 {
        RAM_BASE
    }
    pub fn ram_size() -> u32 {
        RAM_SIZE
    }
    pub fn rom_base() -> u32 {
        ROM_BASE
    }
    pub fn rom_size() -> u32 {
        ROM_SIZE
    }
    pub fn stack_size() -> u32 {
        STACK_SIZE
    }
    pub fn video_base() -> u32 {
        VIDEO_BASE
    }
    pub fn video_width() -> u32 {
        VIDEO_WIDTH
    }
    pub fn video_height() -> u32 {
        VIDEO_HEIGHT
    }
}

/// Framebuffer device configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Whether the framebuffer device is attached at all.
    pub enabled: bool,
    /// Guest base address of the framebuffer.
    pub base: u32,
    /// Width in bytes per scanline.
    pub width: u32,
    /// Height in scanlines.
    pub height: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base: defaults::video_base(),
            width: defaults::video_width(),
            height: defaults::video_height(),
        }
    }
}

/// Complete machine configuration.
///
/// Every field has a default, so an empty JSON object (`{}`) describes the
/// stock machine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of cores, each on its own thread.
    pub cores: u32,
    /// Instruction prefetch depth in words.
    pub prefetch_depth: u32,
    /// Base address of main RAM.
    pub ram_base: u32,
    /// Size of main RAM in bytes.
    pub ram_size: u32,
    /// Base address of the boot ROM.
    pub rom_base: u32,
    /// Size of the boot ROM in bytes.
    pub rom_size: u32,
    /// Per-core stack size in bytes, carved from the top of RAM.
    pub stack_size: u32,
    /// Framebuffer settings.
    pub video: VideoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cores: defaults::cores(),
            prefetch_depth: defaults::prefetch_depth(),
            ram_base: defaults::ram_base(),
            ram_size: defaults::ram_size(),
            rom_base: defaults::rom_base(),
            rom_size: defaults::rom_size(),
            stack_size: defaults::stack_size(),
            video: VideoConfig::default(),
        }
    }
}
