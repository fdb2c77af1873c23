//! SH1106 OLED driver
//!
//! Pushes a [`FrameBuffer`] to a 128x64 SH1106 controller over I2C.

use super::framebuffer::{FrameBuffer, PAGES, WIDTH};

/// SH1106 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Control byte prefixes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
    column_offset: u8,
}

impl<I2C> Sh1106<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub fn new(i2c: I2C, address: u8, column_offset: u8) -> Self {
        Self {
            i2c,
            address,
            column_offset,
        }
    }

    /// Run the power-up sequence and switch the panel on
    pub async fn init(&mut self, contrast: u8) -> Result<(), I2C::Error> {
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            contrast,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c).await?;
        }
        Ok(())
    }

    async fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, cmd]).await
    }

    /// Write every page of `frame` to display RAM
    pub async fn flush(&mut self, frame: &FrameBuffer) -> Result<(), I2C::Error> {
        let low = self.column_offset & 0x0F;
        let high = self.column_offset >> 4;

        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8).await?;
            self.command(cmd::SET_LOW_COLUMN | low).await?;
            self.command(cmd::SET_HIGH_COLUMN | high).await?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(frame.page(page));
            self.i2c.write(self.address, &data).await?;
        }
        Ok(())
    }
}
