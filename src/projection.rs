use std::f64::consts::FRAC_PI_4;

/// Mercator projection fixed on a center coordinate, configured once per
/// pipeline run and passed by reference into the encoding steps.
///
/// `x = tx + k(λ − λc)`, `y = ty − k(ψ(φ) − ψ(φc))` with
/// `ψ(φ) = ln tan(π/4 + φ/2)`, angles in radians. Conformal, so circle
/// markers stay circular.
#[derive(Debug, Clone)]
pub struct Mercator {
    center_lon_rad: f64,
    center_psi: f64,
    scale: f64,
    translate: (f64, f64),
}

impl Mercator {
    pub fn new(center: (f64, f64), scale: f64, translate: (f64, f64)) -> Self {
        let (lon, lat) = center;
        Mercator {
            center_lon_rad: lon.to_radians(),
            center_psi: psi(lat.to_radians()),
            scale,
            translate,
        }
    }

    pub fn project(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let x = self.translate.0 + self.scale * (longitude.to_radians() - self.center_lon_rad);
        let y = self.translate.1 - self.scale * (psi(latitude.to_radians()) - self.center_psi);
        (x, y)
    }
}

fn psi(lat_rad: f64) -> f64 {
    (FRAC_PI_4 + lat_rad / 2.0).tan().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc() -> Mercator {
        Mercator::new((-73.94, 40.70), 45000.0, (300.0, 237.5))
    }

    #[test]
    fn center_maps_to_translate() {
        let (x, y) = nyc().project(-73.94, 40.70);
        assert!((x - 300.0).abs() < 1e-9);
        assert!((y - 237.5).abs() < 1e-9);
    }

    #[test]
    fn east_is_right_and_north_is_up() {
        let projection = nyc();
        let (cx, cy) = projection.project(-73.94, 40.70);
        let (east_x, _) = projection.project(-73.80, 40.70);
        let (_, north_y) = projection.project(-73.94, 40.85);
        assert!(east_x > cx);
        assert!(north_y < cy);
    }

    #[test]
    fn projection_is_reused_not_reconfigured() {
        // same input, same output, every time
        let projection = nyc();
        let first = projection.project(-73.97, 40.78);
        let second = projection.project(-73.97, 40.78);
        assert_eq!(first, second);
    }
}
