#![no_main]
use inibind::Scalar;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let scalar = Scalar::new(text);
        let _ = scalar.to_f64();
        let _ = scalar.to_f32();
        let _ = scalar.to_u64();
        let _ = scalar.to_i64();
        let _ = scalar.to_int::<i8>();
        let _ = scalar.to_bool();
    }
});
