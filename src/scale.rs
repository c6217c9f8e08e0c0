// Visual-encoding scales: pure functions from data space to pixel or color
// space, constructed once per pipeline run and applied per record.

/// Linear interpolation from a numeric domain onto a numeric range. The range
/// may be inverted (start > end), which is how the y axis puts 0% at the
/// bottom of the chart.
#[derive(Debug, Clone)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 - d0 == 0.0 {
            return self.range.0;
        }
        let t = (value - d0) / (d1 - d0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Tick values covering the domain, roughly `count` of them, stepped at a
    /// power of ten times 1, 2 or 5.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut d0, mut d1) = self.domain;
        if d0 > d1 {
            std::mem::swap(&mut d0, &mut d1);
        }
        let step = tick_increment(d0, d1, count);
        if step <= 0.0 || !step.is_finite() {
            return vec![d0];
        }
        let start = (d0 / step).ceil();
        let stop = (d1 / step).floor();
        let n = (stop - start) as usize;
        (0..=n).map(|i| (start + i as f64) * step).collect()
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 7.07 {
        10.0
    } else if error >= 3.16 {
        5.0
    } else if error >= 1.41 {
        2.0
    } else {
        1.0
    };
    factor * 10f64.powf(power)
}

/// Square-root scale for circle radii, so marker area tracks the data value.
/// An unset (zero-width) domain collapses every output to the range start.
#[derive(Debug, Clone)]
pub struct SqrtScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        SqrtScale { domain, range }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let span = d1.sqrt() - d0.sqrt();
        if span == 0.0 {
            return self.range.0;
        }
        let t = (value.sqrt() - d0.sqrt()) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

// ColorBrewer RdYlBu, 11 stops, red at 0 and blue at 1.
const RD_YL_BU: [(u8, u8, u8); 11] = [
    (0xa5, 0x00, 0x26),
    (0xd7, 0x30, 0x27),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x90),
    (0xff, 0xff, 0xbf),
    (0xe0, 0xf3, 0xf8),
    (0xab, 0xd9, 0xe9),
    (0x74, 0xad, 0xd1),
    (0x45, 0x75, 0xb4),
    (0x31, 0x36, 0x95),
];

/// Sequential scale through the diverging red-yellow-blue interpolator.
///
/// Deliberately unclamped: inputs outside the domain extrapolate past the
/// interpolator's endpoint colors (channels still clip to the displayable
/// range). NaN input degrades to the low-end color rather than erroring.
#[derive(Debug, Clone)]
pub struct SequentialScale {
    domain: (f64, f64),
}

impl SequentialScale {
    pub fn rd_yl_bu() -> Self {
        SequentialScale { domain: (0.0, 1.0) }
    }

    pub fn scale(&self, value: f64) -> String {
        let (d0, d1) = self.domain;
        let t = if d1 - d0 == 0.0 { 0.0 } else { (value - d0) / (d1 - d0) };
        interpolate_rd_yl_bu(t)
    }
}

fn interpolate_rd_yl_bu(t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t };
    let segments = (RD_YL_BU.len() - 1) as f64;
    // clamp to the terminal segments so out-of-range t extrapolates linearly
    let position = t * segments;
    let i = (position.floor() as isize).clamp(0, RD_YL_BU.len() as isize - 2) as usize;
    let f = position - i as f64;
    let (r0, g0, b0) = RD_YL_BU[i];
    let (r1, g1, b1) = RD_YL_BU[i + 1];
    let channel = |a: u8, b: u8| -> u8 {
        let v = a as f64 + f * (b as f64 - a as f64);
        v.round().clamp(0.0, 255.0) as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(r0, r1), channel(g0, g1), channel(b0, b1))
}

// The standard 10-color categorical palette.
const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Ordinal scale: discrete keys get palette colors in first-seen order,
/// cycling if there are more than ten distinct keys.
#[derive(Debug, Clone, Default)]
pub struct OrdinalScale {
    seen: Vec<String>,
}

impl OrdinalScale {
    pub fn category10() -> Self {
        OrdinalScale::default()
    }

    pub fn scale(&mut self, key: &str) -> String {
        let index = match self.seen.iter().position(|k| k == key) {
            Some(i) => i,
            None => {
                self.seen.push(key.to_string());
                self.seen.len() - 1
            }
        };
        CATEGORY10[index % CATEGORY10.len()].to_string()
    }
}

/// Integer percent formatting, e.g. 0.847 -> "85%".
pub fn format_percent(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}
