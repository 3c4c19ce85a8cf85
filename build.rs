use std::env;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use proc_macro2::{Literal, TokenStream};
use quote::format_ident;
use quote::quote;

mod build_serde;
// Structures imported from build_serde.rs
use build_serde::{Access, Pinmux, RegisterMap};

/// SCU pin configuration registers: SFSPm_n = SCU + m * 0x80 + n * 4.
const SCU_PORT_STRIDE: u32 = 0x80;
const SCU_PIN_STRIDE: u32 = 0x4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = Path::new("data").join("lpc43xx");
    println!("cargo:rerun-if-changed={}", data_dir.display());

    // Read and parse registers.yaml
    let registers_path = data_dir.join("registers.yaml");
    let registers_content = fs::read_to_string(&registers_path)
        .map_err(|e| format!("Failed to read registers.yaml: {}", e))?;
    let registers: RegisterMap = serde_yaml::from_str(&registers_content)
        .map_err(|e| format!("Failed to parse registers.yaml: {}", e))?;

    // Read and parse pinmux.yaml
    let pinmux_path = data_dir.join("pinmux.yaml");
    let pinmux_content = fs::read_to_string(&pinmux_path)
        .map_err(|e| format!("Failed to read pinmux.yaml: {}", e))?;
    let pinmux: Pinmux = serde_yaml::from_str(&pinmux_content)
        .map_err(|e| format!("Failed to parse pinmux.yaml: {}", e))?;

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dest_path = out_dir.join("_generated.rs");

    let mut token_stream = TokenStream::new();

    token_stream.extend(generate_register_blocks(&registers));
    token_stream.extend(generate_memory_constants(&registers));
    token_stream.extend(generate_spifi_pins(&registers, &pinmux)?);

    let mut file = File::create(&dest_path).unwrap();
    write!(file, "{}", token_stream).unwrap();
    rustfmt(&dest_path);

    place_memory_x(&out_dir);

    Ok(())
}

/// One module per block: `BASE` plus one typed `Reg` constant per register.
fn generate_register_blocks(registers: &RegisterMap) -> TokenStream {
    let mut blocks = TokenStream::new();

    for (name, block) in &registers.blocks {
        let mod_ident = format_ident!("{}", name.to_lowercase());
        let base = hex_literal(block.base_address);
        let block_doc = block.description.clone().unwrap_or_else(|| name.clone());

        let regs = block.registers.iter().map(|reg| {
            let reg_ident = format_ident!("{}", reg.name);
            let addr = hex_literal(block.base_address + reg.byte_offset);
            let ty = type_path(&reg.fieldset);
            let access = match reg.access {
                Access::ReadWrite => "read-write",
                Access::Read => "read-only",
                Access::Write => "write-only",
            };
            let doc = format!(
                "{} ({}, offset 0x{:03X})",
                reg.description.clone().unwrap_or_else(|| reg.name.clone()),
                access,
                reg.byte_offset
            );
            quote! {
                #[doc = #doc]
                pub const #reg_ident: crate::regs::Reg<#ty> = crate::regs::Reg::from_addr(#addr);
            }
        });

        blocks.extend(quote! {
            #[doc = #block_doc]
            pub mod #mod_ident {
                /// Block base address.
                pub const BASE: usize = #base;
                #(#regs)*
            }
        });
    }

    blocks
}

fn generate_memory_constants(registers: &RegisterMap) -> TokenStream {
    let consts = registers.memory.iter().map(|(name, value)| {
        let ident = format_ident!("{}", name);
        let value = hex_literal(*value);
        quote! {
            pub const #ident: usize = #value;
        }
    });

    quote! {
        /// Memory regions.
        pub mod memory {
            #(#consts)*
        }
    }
}

/// SPIFI pin table. All pins must share one SCU function.
fn generate_spifi_pins(
    registers: &RegisterMap,
    pinmux: &Pinmux,
) -> Result<TokenStream, Box<dyn std::error::Error>> {
    let scu = registers
        .blocks
        .get("SCU")
        .ok_or("SCU block not found in registers.yaml")?;

    let first = pinmux.spifi.first().ok_or("pinmux.yaml lists no SPIFI pins")?;
    if let Some(odd) = pinmux.spifi.iter().find(|p| p.function != first.function) {
        return Err(format!(
            "pinmux.yaml: {} uses function {} but {} uses {}; SPIFI pins must share one pin configuration",
            odd.pin, odd.function, first.pin, first.function
        )
        .into());
    }

    let mut pins = Vec::new();
    for pin in &pinmux.spifi {
        let (port, number) = pin
            .port_and_pin()
            .ok_or_else(|| format!("pinmux.yaml: invalid pin name {}", pin.pin))?;
        let addr = hex_literal(scu.base_address + port * SCU_PORT_STRIDE + number * SCU_PIN_STRIDE);
        let name = &pin.pin;
        let signal = &pin.signal;
        pins.push(quote! {
            crate::scu::Pin {
                name: #name,
                signal: #signal,
                reg: crate::regs::Reg::from_addr(#addr),
            }
        });
    }

    let count = pins.len();
    let function = first.function;

    Ok(quote! {
        /// SCU function number selecting SPIFI on every SPIFI pin.
        pub const SPIFI_PIN_FUNCTION: u8 = #function;

        /// Pins wired to the SPIFI flash.
        pub const SPIFI_PINS: [crate::scu::Pin; #count] = [#(#pins),*];
    })
}

/// Put `memory.x` where the linker finds it when building firmware.
fn place_memory_x(out_dir: &Path) {
    let target = env::var("TARGET").unwrap_or_default();
    if !target.starts_with("thumb") {
        return;
    }

    File::create(out_dir.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
}

fn hex_literal(value: u32) -> TokenStream {
    let lit: Literal = format!("0x{:08X}", value).parse().unwrap();
    quote!(#lit)
}

fn type_path(path: &str) -> TokenStream {
    path.parse()
        .unwrap_or_else(|_| panic!("Invalid fieldset path: {}", path))
}

/// rustfmt a given path.
/// Failures are logged to stderr and ignored.
fn rustfmt(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match Command::new("rustfmt").args([path]).output() {
        Err(e) => {
            eprintln!("failed to exec rustfmt {:?}: {:?}", path, e);
        }
        Ok(out) => {
            if !out.status.success() {
                eprintln!("rustfmt {:?} failed:", path);
                eprintln!("=== STDOUT:");
                std::io::stderr().write_all(&out.stdout).unwrap();
                eprintln!("=== STDERR:");
                std::io::stderr().write_all(&out.stderr).unwrap();
            }
        }
    }
}
