//! Host classes backing the standard library's `nat fn` declarations.

use std::time::Duration;

use super::{HostClass, HostMethod, HostParam, HostRegistry, HostType, NativeValue};
use crate::typeck::types::Primitive;

pub const STD_CLASS: &str = "mi.std.Std";
pub const TERMION_CLASS: &str = "mi.std.Termion";

const PRINTABLE: [Primitive; 7] = [
    Primitive::String,
    Primitive::Int,
    Primitive::Long,
    Primitive::Double,
    Primitive::Float,
    Primitive::Bool,
    Primitive::Char,
];

pub fn register(registry: &mut HostRegistry) {
    registry.register(std_class());
    registry.register(termion_class());
}

fn std_class() -> HostClass {
    let mut class = HostClass::new(STD_CLASS);
    for p in PRINTABLE {
        class = class
            .method(HostMethod::callable_static("print", vec![HostParam::boxed(p)], HostType::Void, print))
            .method(HostMethod::callable_static("println", vec![HostParam::boxed(p)], HostType::Void, println));
    }
    class
        .method(HostMethod::callable_static(
            "sleep",
            vec![HostParam::boxed(Primitive::Long)],
            HostType::Void,
            sleep,
        ))
        .method(
            HostMethod::callable_static("random_uuid_long", vec![], HostType::Boxed(Primitive::Long), random_uuid_long)
                .nonnull_return(),
        )
}

fn termion_class() -> HostClass {
    let rgb = || vec![HostParam::boxed(Primitive::Int); 3];
    let hex = || vec![HostParam::boxed(Primitive::String)];
    let string = HostType::Boxed(Primitive::String);
    HostClass::new(TERMION_CLASS)
        .method(HostMethod::callable_static("color_fg", rgb(), string, color_fg_rgb).nonnull_return())
        .method(HostMethod::callable_static("color_fg", hex(), string, color_fg_hex).nonnull_return())
        .method(HostMethod::callable_static("color_bg", rgb(), string, color_bg_rgb).nonnull_return())
        .method(HostMethod::callable_static("color_bg", hex(), string, color_bg_hex).nonnull_return())
        .method(HostMethod::callable_static("reset", vec![], string, reset).nonnull_return())
}

fn print(args: &[NativeValue]) -> Option<NativeValue> {
    if let Some(v) = args.first() {
        print!("{v}");
    }
    None
}

fn println(args: &[NativeValue]) -> Option<NativeValue> {
    match args.first() {
        Some(v) => println!("{v}"),
        None => println!(),
    }
    None
}

fn sleep(args: &[NativeValue]) -> Option<NativeValue> {
    let millis = args.first().and_then(NativeValue::as_i64).unwrap_or(0);
    std::thread::sleep(Duration::from_millis(millis.max(0) as u64));
    None
}

fn random_uuid_long(_: &[NativeValue]) -> Option<NativeValue> {
    let high = (uuid::Uuid::new_v4().as_u128() >> 64) as u64;
    Some(NativeValue::Long(high as i64))
}

fn channel(args: &[NativeValue], i: usize) -> u8 {
    args.get(i).and_then(NativeValue::as_i64).unwrap_or(0).clamp(0, 255) as u8
}

/// Parse `#rrggbb` or `rrggbb`.
fn parse_hex(args: &[NativeValue]) -> Option<(u8, u8, u8)> {
    let s = args.first()?.as_str()?.trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let part = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16).ok();
    Some((part(0..2)?, part(2..4)?, part(4..6)?))
}

fn ansi(layer: u8, (r, g, b): (u8, u8, u8)) -> NativeValue {
    NativeValue::String(format!("\x1b[{layer};2;{r};{g};{b}m"))
}

fn color_fg_rgb(args: &[NativeValue]) -> Option<NativeValue> {
    Some(ansi(38, (channel(args, 0), channel(args, 1), channel(args, 2))))
}

fn color_bg_rgb(args: &[NativeValue]) -> Option<NativeValue> {
    Some(ansi(48, (channel(args, 0), channel(args, 1), channel(args, 2))))
}

fn color_fg_hex(args: &[NativeValue]) -> Option<NativeValue> {
    Some(parse_hex(args).map_or(NativeValue::String(String::new()), |rgb| ansi(38, rgb)))
}

fn color_bg_hex(args: &[NativeValue]) -> Option<NativeValue> {
    Some(parse_hex(args).map_or(NativeValue::String(String::new()), |rgb| ansi(48, rgb)))
}

fn reset(_: &[NativeValue]) -> Option<NativeValue> {
    Some(NativeValue::String("\x1b[0m".into()))
}
