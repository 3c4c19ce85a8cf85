//! M4 image for an LPC4330 booting from SPIFI. Everything happens in the bootstrap's entry
//! point; the M0APP image is expected at 0x1404_0000.

#![no_std]
#![no_main]

use defmt_rtt as _;
use lpc43xx_bootstrap as _;
use panic_probe as _;
