//! Incoming half of the link: the UART receiver and its listener slot.
//!
//! The receive interrupt forwards every byte to whatever listener is
//! currently registered. The listener lives on the event loop's stack, so
//! registration goes through [`ListenerGuard`], which pins the borrow for
//! its own lifetime and clears the slot again on drop.

use core::marker::PhantomData;
use core::ptr::NonNull;

use spin::Mutex;

use crate::board::UartPort;

/// The receiver singleton; the UART interrupt reaches it through
/// [`on_uart_byte`].
pub static RECEIVER: Receiver<UartPort> = Receiver::new(UartPort);

/// UART receive interrupt entry point.
pub fn on_uart_byte(value: u8) {
    RECEIVER.on_receive(value);
}

/// Receives each byte the UART delivers, in interrupt context.
pub trait ByteListener: Sync {
    fn process(&self, value: u8);
}

/// Runtime control over the receive path of the UART.
pub trait UartControl {
    fn set_enabled(&self, on: bool);
}

/// Baud-rate register setting for the configured peripheral clock; applied
/// by the startup code.
pub const SPEED_MANTISSA: u16 = 8;
pub const SPEED_FRACTION: u16 = 11;

struct ListenerSlot(Mutex<Option<NonNull<dyn ByteListener>>>);

// The raw pointer is only dereferenced while a `ListenerGuard` keeps the
// listener alive and in place.
unsafe impl Send for ListenerSlot {}
unsafe impl Sync for ListenerSlot {}

/// UART receiver with a single registered listener.
pub struct Receiver<U: UartControl> {
    uart: U,
    listener: ListenerSlot,
}

impl<U: UartControl> Receiver<U> {
    pub const fn new(uart: U) -> Self {
        Self {
            uart,
            listener: ListenerSlot(Mutex::new(None)),
        }
    }

    /// Interrupt entry point for one received byte. Bytes that arrive with
    /// no listener registered are discarded.
    pub fn on_receive(&self, value: u8) {
        let slot = self.listener.0.lock();
        if let Some(listener) = *slot {
            unsafe { listener.as_ref() }.process(value);
        }
    }

    /// The transceiver runs only while somebody consumes its bytes.
    fn listen(&self, listener: Option<NonNull<dyn ByteListener>>) {
        self.uart.set_enabled(listener.is_some());
        *self.listener.0.lock() = listener;
    }
}

/// Scoped listener registration; unregisters on drop.
pub struct ListenerGuard<'a, U: UartControl + 'static> {
    receiver: &'static Receiver<U>,
    _listener: PhantomData<&'a dyn ByteListener>,
}

impl<'a, U: UartControl + 'static> ListenerGuard<'a, U> {
    pub fn new(receiver: &'static Receiver<U>, listener: &'a (dyn ByteListener + 'a)) -> Self {
        // SAFETY: the guard borrows `listener` for 'a and clears the slot
        // before 'a ends, so the erased lifetime never outlives the data.
        let erased = unsafe {
            core::mem::transmute::<NonNull<dyn ByteListener + 'a>, NonNull<dyn ByteListener>>(
                NonNull::from(listener),
            )
        };
        receiver.listen(Some(erased));
        Self {
            receiver,
            _listener: PhantomData,
        }
    }
}

impl<U: UartControl + 'static> Drop for ListenerGuard<'_, U> {
    fn drop(&mut self) {
        self.receiver.listen(None);
    }
}
