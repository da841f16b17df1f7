//! Loader relocation.
//!
//! The loader erases and reprograms the flash region it was itself loaded
//! from; code that erases the region it executes from is undefined. Before
//! any flash operation the `.loader` section is therefore copied, word for
//! word over a fixed linker-provided extent, into its reserved RAM
//! execution window.

use core::{ffi::c_void, ptr};

extern "C" {
    static __loader_flash_start: c_void;
    static __loader_ram_start: c_void;
    static __loader_ram_end: c_void;
}

/// Copies the loader image into the RAM execution window.
pub fn stage() {
    unsafe {
        let src = &__loader_flash_start as *const _ as *const u32;
        let dst = &__loader_ram_start as *const _ as *mut u32;
        let end = &__loader_ram_end as *const _ as *const u32;

        let words = end.offset_from(dst) as usize;
        for i in 0..words {
            ptr::write_volatile(dst.add(i), ptr::read_volatile(src.add(i)));
        }
        defmt::debug!("staged {} loader words", words);
    }
}
