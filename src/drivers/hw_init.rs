//! One-shot hardware peripheral initialization and raw register helpers.
//!
//! Configures the motor direction GPIOs, the LEDC power channels, the
//! calibration button input and the telemetry UART using raw ESP-IDF sys
//! calls.  Called once from `main()` before the read loop starts.
//!
//! Every helper has a host counterpart so drivers above this layer build
//! and test without hardware.

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::info;

use crate::config::LinkConfig;
#[cfg(feature = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    UartInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc)  => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)    => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("gpio"),
            HwInitError::LedcInitFailed(_) => Self::Init("ledc"),
            HwInitError::UartInstallFailed(_) => Self::Init("uart"),
        }
    }
}

#[cfg(feature = "espidf")]
pub fn init_peripherals(link: &LinkConfig) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any other task exists.
    unsafe {
        init_gpio_outputs()?;
        init_button_input()?;
        init_ledc()?;
        init_uart(link)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_peripherals(link: &LinkConfig) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped (uart{} @ {} baud)", link.uart_port, link.baud_rate);
    Ok(())
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &[pins::LEFT_DIR_GPIO, pins::RIGHT_DIR_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        // Direction LOW = forward at boot.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: direction GPIOs configured");
    Ok(())
}

#[cfg(feature = "espidf")]
unsafe fn init_button_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::CALIBRATE_BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: register read on an already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Host: inputs idle high (pull-up, button released).
#[cfg(not(feature = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(feature = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as output in init_gpio_outputs().
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(feature = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_LEFT: u32 = 0;
pub const LEDC_CH_RIGHT: u32 = 1;

#[cfg(feature = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: both motor channels (20 kHz, 8-bit so duty maps 1:1 to 0..=255)
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::MOTOR_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    for (channel, gpio) in [
        (LEDC_CH_LEFT, pins::LEFT_PWM_GPIO),
        (LEDC_CH_RIGHT, pins::RIGHT_PWM_GPIO),
    ] {
        let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        }) };
        if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }
    }

    info!("hw_init: LEDC configured (left=CH0, right=CH1)");
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: channels configured in init_ledc(); only the read loop
    // thread writes duty.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(feature = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

// ── UART ──────────────────────────────────────────────────────

/// Driver-side RX ring buffer.
pub const UART_RX_RING: usize = 2048;

#[cfg(feature = "espidf")]
unsafe fn init_uart(link: &LinkConfig) -> Result<(), HwInitError> {
    let port = i32::from(link.uart_port);
    let cfg = uart_config_t {
        baud_rate: link.baud_rate as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(port, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInstallFailed(ret)); }

    let ret = unsafe {
        uart_set_pin(
            port,
            pins::TELEMETRY_TX_GPIO,
            pins::TELEMETRY_RX_GPIO,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        )
    };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInstallFailed(ret)); }

    let ret = unsafe {
        uart_driver_install(port, UART_RX_RING as i32, 0, 0, core::ptr::null_mut(), 0)
    };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInstallFailed(ret)); }

    info!("hw_init: UART{} installed ({} baud)", port, link.baud_rate);
    Ok(())
}

/// Non-blocking UART read.  Returns bytes copied, or the raw error code.
#[cfg(feature = "espidf")]
pub fn uart_read(port: u8, buf: &mut [u8]) -> Result<usize, i32> {
    // SAFETY: driver installed in init_uart(); zero-tick wait never blocks.
    let n = unsafe {
        uart_read_bytes(i32::from(port), buf.as_mut_ptr().cast(), buf.len() as u32, 0)
    };
    if n < 0 { Err(n) } else { Ok(n as usize) }
}

#[cfg(not(feature = "espidf"))]
pub fn uart_read(_port: u8, _buf: &mut [u8]) -> Result<usize, i32> {
    Ok(0)
}

#[cfg(feature = "espidf")]
pub fn uart_write(port: u8, data: &[u8]) -> Result<usize, i32> {
    // SAFETY: driver installed; buffer valid for data.len() bytes.
    let n = unsafe { uart_write_bytes(i32::from(port), data.as_ptr().cast(), data.len()) };
    if n < 0 { Err(n) } else { Ok(n as usize) }
}

#[cfg(not(feature = "espidf"))]
pub fn uart_write(_port: u8, data: &[u8]) -> Result<usize, i32> {
    Ok(data.len())
}

#[cfg(feature = "espidf")]
pub fn uart_release(port: u8) {
    // SAFETY: deleting an installed driver; later reads fail with an error
    // code rather than touching freed memory.
    let ret = unsafe { uart_driver_delete(i32::from(port)) };
    if ret != ESP_OK as i32 {
        log::warn!("hw_init: UART{} delete returned {}", port, ret);
    }
}

#[cfg(not(feature = "espidf"))]
pub fn uart_release(_port: u8) {}
