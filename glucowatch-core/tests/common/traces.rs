//! Glucose profiles (mg/dL per reading)

/// Steady euglycemia
pub fn steady(value: f32, readings: usize) -> Vec<f32> {
    vec![value; readings]
}

/// Linear ramp from `from` to `to` over `readings` readings
pub fn ramp(from: f32, to: f32, readings: usize) -> Vec<f32> {
    let step = if readings > 1 {
        (to - from) / (readings - 1) as f32
    } else {
        0.0
    };
    (0..readings).map(|i| from + step * i as f32).collect()
}

/// Overnight hypoglycemic dip: normal, falls below 70, recovers
pub fn nocturnal_dip() -> Vec<f32> {
    let mut trace = steady(110.0, 3);
    trace.extend(steady(55.0, 4));
    trace.extend(steady(110.0, 4));
    trace
}
