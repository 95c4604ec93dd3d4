//! STM32F429 board glue: register-level implementations of the hardware
//! traits and the interrupt vector entry points.
//!
//! Only runtime operations live here. Clock tree, pin muxing, NVIC
//! priorities and the TIM6 microsecond prescaler are configured by the
//! startup code before `run` is entered.

use crate::command::{on_joystick_button, Button};
use crate::drivers::block::on_card_detect;
use crate::drivers::lcd::PanelBus;
use crate::transceiver::receiver::{on_uart_byte, UartControl};
use crate::transceiver::transmitter::{
    on_clear_to_send, on_overwrite, on_ready_to_send, PortPins, PulseTimer,
};

const GPIOB_BASE: usize = 0x4002_0400;
const GPIOD_BASE: usize = 0x4002_0C00;
const GPIOF_BASE: usize = 0x4002_1400;
const GPIO_IDR: usize = 0x10;
const GPIO_ODR: usize = 0x14;
const GPIO_BSRR: usize = 0x18;

const RCC_BASE: usize = 0x4002_3800;
const RCC_APB2RSTR: usize = 0x24;
const RCC_APB2ENR: usize = 0x44;
const RCC_SDIOEN: u32 = 1 << 11;

const SDIO_BASE: usize = 0x4001_2C00;

const EXTI_BASE: usize = 0x4001_3C00;
const EXTI_PR: usize = 0x14;

const TIM6_BASE: usize = 0x4000_1000;
const TIM_CR1: usize = 0x00;
const TIM_SR: usize = 0x10;
const TIM_CNT: usize = 0x24;
const TIM_ARR: usize = 0x2C;
const TIM_CR1_CEN: u32 = 1 << 0;
const TIM_SR_UIF: u32 = 1 << 0;

const USART6_BASE: usize = 0x4001_1400;
const USART_SR: usize = 0x00;
const USART_DR: usize = 0x04;
const USART_CR1: usize = 0x0C;
const USART_SR_RXNE: u32 = 1 << 5;
const USART_CR1_UE: u32 = 1 << 13;

// LCD window on FSMC bank 1: RS is address line 0, so the controller sees
// word 0 as command and word 1 as data.
const LCD_COMMAND: usize = 0x6000_0000;
const LCD_DATA: usize = 0x6000_0002;

fn read_reg(address: usize) -> u32 {
    unsafe { (address as *const u32).read_volatile() }
}

fn write_reg(address: usize, value: u32) {
    unsafe { (address as *mut u32).write_volatile(value) }
}

fn read_reg16(address: usize) -> u16 {
    unsafe { (address as *const u16).read_volatile() }
}

fn write_reg16(address: usize, value: u16) {
    unsafe { (address as *mut u16).write_volatile(value) }
}

/// SDIO peripheral window plus card-detect (PD3, active low) and power.
pub struct SdioPort;

impl stm32f4_sdio::SdioBus for SdioPort {
    fn read_reg(&self, offset: usize) -> u32 {
        read_reg(SDIO_BASE + offset)
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        write_reg(SDIO_BASE + offset, value);
    }

    fn card_present(&self) -> bool {
        read_reg(GPIOD_BASE + GPIO_IDR) & (1 << 3) == 0
    }

    fn power(&mut self, on: bool) {
        use stm32f4_sdio::register::{POWER_ON, POWER_REG};
        if on {
            write_reg(RCC_BASE + RCC_APB2ENR, read_reg(RCC_BASE + RCC_APB2ENR) | RCC_SDIOEN);
            write_reg(SDIO_BASE + POWER_REG, POWER_ON);
        } else {
            write_reg(SDIO_BASE + POWER_REG, 0);
            let rstr = read_reg(RCC_BASE + RCC_APB2RSTR);
            write_reg(RCC_BASE + RCC_APB2RSTR, rstr | RCC_SDIOEN);
            write_reg(RCC_BASE + RCC_APB2RSTR, rstr & !RCC_SDIOEN);
            write_reg(RCC_BASE + RCC_APB2ENR, read_reg(RCC_BASE + RCC_APB2ENR) & !RCC_SDIOEN);
        }
    }
}

/// Parallel-port lines: data on PB8..PB15, RTS on PB7 (high = valid).
pub struct LinkPins;

impl PortPins for LinkPins {
    fn expose_data(&self, value: u8) {
        let odr = read_reg(GPIOB_BASE + GPIO_ODR);
        write_reg(GPIOB_BASE + GPIO_ODR, (odr & !0xFF00) | (value as u32) << 8);
    }

    fn set_rts(&self, ready: bool) {
        let bit = if ready { 1 << 7 } else { 1 << (7 + 16) };
        write_reg(GPIOB_BASE + GPIO_BSRR, bit);
    }
}

/// TIM6 in one-pulse mode; the prescaler holds the microsecond scale.
pub struct TransferTimer;

impl PulseTimer for TransferTimer {
    fn arm_micros(&self, delay: u16) {
        write_reg(TIM6_BASE + TIM_CNT, 0);
        write_reg(TIM6_BASE + TIM_ARR, delay as u32);
        write_reg(TIM6_BASE + TIM_CR1, read_reg(TIM6_BASE + TIM_CR1) | TIM_CR1_CEN);
    }
}

/// USART6 receive path.
pub struct UartPort;

impl UartControl for UartPort {
    fn set_enabled(&self, on: bool) {
        let cr1 = read_reg(USART6_BASE + USART_CR1);
        let cr1 = if on {
            cr1 | USART_CR1_UE
        } else {
            cr1 & !USART_CR1_UE
        };
        write_reg(USART6_BASE + USART_CR1, cr1);
    }
}

/// LCD controller window plus the backlight switch on PF5.
pub struct PanelPort;

impl PanelBus for PanelPort {
    fn write_command(&self, opcode: u16) {
        write_reg16(LCD_COMMAND, opcode);
    }

    fn write_data(&self, value: u16) {
        write_reg16(LCD_DATA, value);
    }

    fn read_data(&self) -> u16 {
        read_reg16(LCD_DATA)
    }

    fn backlight(&self, on: bool) {
        let bit = if on { 1 << 5 } else { 1 << (5 + 16) };
        write_reg(GPIOF_BASE + GPIO_BSRR, bit);
    }
}

fn clear_exti_pending(line: u32) {
    write_reg(EXTI_BASE + EXTI_PR, 1 << line);
}

fn exti_pending(line: u32) -> bool {
    read_reg(EXTI_BASE + EXTI_PR) & (1 << line) != 0
}

#[no_mangle]
pub extern "C" fn EXTI0_IRQHandler() {
    on_joystick_button(Button::Up);
    clear_exti_pending(0);
}

#[no_mangle]
pub extern "C" fn EXTI1_IRQHandler() {
    on_joystick_button(Button::Down);
    clear_exti_pending(1);
}

#[no_mangle]
pub extern "C" fn EXTI3_IRQHandler() {
    clear_exti_pending(3);
    on_card_detect();
}

#[no_mangle]
pub extern "C" fn EXTI9_5_IRQHandler() {
    if exti_pending(5) {
        on_overwrite();
        clear_exti_pending(5);
    } else if exti_pending(6) {
        on_clear_to_send();
        clear_exti_pending(6);
    }
}

#[no_mangle]
pub extern "C" fn EXTI15_10_IRQHandler() {
    if exti_pending(14) {
        clear_exti_pending(14);
        on_joystick_button(Button::Right);
    } else if exti_pending(15) {
        clear_exti_pending(15);
        on_joystick_button(Button::Left);
    }
}

#[no_mangle]
pub extern "C" fn TIM6_DAC_IRQHandler() {
    on_ready_to_send();
    write_reg(
        TIM6_BASE + TIM_SR,
        read_reg(TIM6_BASE + TIM_SR) & !TIM_SR_UIF,
    );
}

#[no_mangle]
pub extern "C" fn USART6_IRQHandler() {
    if read_reg(USART6_BASE + USART_SR) & USART_SR_RXNE == 0 {
        // Error flags clear on the DR read.
        let _ = read_reg(USART6_BASE + USART_DR);
    } else {
        on_uart_byte(read_reg(USART6_BASE + USART_DR) as u8);
    }
}
