// lf-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type Volume = UomVolume;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

pub mod constants {
    use super::*;

    /// Gravitational acceleration used by the hydraulic reference models, m/s².
    pub const G_MPS2: f64 = 9.81;

    /// Density of water.
    #[inline]
    pub fn rho_water() -> Density {
        kgpm3(1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(m(2.0).value, 2.0);
        assert_eq!(m2(16.0).value, 16.0);
        assert_eq!(m3(0.5).value, 0.5);
        assert_eq!(kg(1.2).value, 1.2);
        assert_eq!(constants::rho_water().value, 1000.0);
    }

    #[test]
    fn area_times_length_is_volume() {
        let v: Volume = m2(16.0) * m(10.0);
        assert!((v.value - 160.0).abs() < 1e-12);
    }

    #[test]
    fn mass_over_density_is_volume() {
        let v: Volume = kg(160_000.0) / constants::rho_water();
        assert!((v.value - 160.0).abs() < 1e-9);
    }
}
