//! Globally adaptive Gauss-Kronrod quadrature.

use super::{Estimate, IntegrationError, Settings};

/// Gauss-Kronrod pair. The Gauss nodes are the odd entries of `xgk`; the last
/// entry is the centre of the interval.
pub(crate) struct Rule {
    xgk: &'static [f64],
    wgk: &'static [f64],
    wg: &'static [f64],
}

pub(crate) const GK15: Rule = Rule {
    xgk: &[
        0.991_455_371_120_812_639_206_854_697_526_329,
        0.949_107_912_342_758_524_526_189_684_047_851,
        0.864_864_423_359_769_072_789_712_788_640_926,
        0.741_531_185_599_394_439_863_864_773_280_788,
        0.586_087_235_467_691_130_294_144_845_693_013,
        0.405_845_151_377_397_166_906_606_412_076_961,
        0.207_784_955_007_898_467_600_689_403_773_245,
        0.0,
    ],
    wgk: &[
        0.022_935_322_010_529_224_963_732_008_058_970,
        0.063_092_092_629_978_553_290_700_663_189_204,
        0.104_790_010_322_250_183_839_876_322_541_518,
        0.140_653_259_715_525_918_745_189_590_510_238,
        0.169_004_726_639_267_902_826_583_426_598_550,
        0.190_350_578_064_785_409_913_256_402_421_014,
        0.204_432_940_075_298_892_414_161_999_234_649,
        0.209_482_141_084_727_828_012_999_174_891_714,
    ],
    wg: &[
        0.129_484_966_168_869_693_270_611_432_679_082,
        0.279_705_391_489_276_667_901_467_771_423_780,
        0.381_830_050_505_118_944_950_369_775_488_975,
        0.417_959_183_673_469_387_755_102_040_816_327,
    ],
};

pub(crate) const GK21: Rule = Rule {
    xgk: &[
        0.995_657_163_025_808_080_735_527_280_689_003,
        0.973_906_528_517_171_720_077_964_012_084_452,
        0.930_157_491_355_708_226_001_207_180_059_508,
        0.865_063_366_688_984_510_732_096_688_423_493,
        0.780_817_726_586_416_897_063_717_578_345_042,
        0.679_409_568_299_024_406_234_327_365_114_874,
        0.562_757_134_668_604_683_339_000_099_272_694,
        0.433_395_394_129_247_190_799_265_943_165_784,
        0.294_392_862_701_460_198_131_126_603_103_866,
        0.148_874_338_981_631_210_884_826_001_129_720,
        0.0,
    ],
    wgk: &[
        0.011_694_638_867_371_874_278_064_396_062_192,
        0.032_558_162_307_964_727_478_818_972_459_390,
        0.054_755_896_574_351_996_031_381_300_244_580,
        0.075_039_674_810_919_952_767_043_140_916_190,
        0.093_125_454_583_697_605_535_065_465_083_366,
        0.109_387_158_802_297_641_899_210_590_325_805,
        0.123_491_976_262_065_851_077_208_931_966_538,
        0.134_709_217_311_473_325_928_054_001_771_707,
        0.142_775_938_577_060_080_797_094_273_138_717,
        0.147_739_104_901_338_491_374_841_515_972_068,
        0.149_445_554_002_916_905_664_936_468_389_821,
    ],
    wg: &[
        0.066_671_344_308_688_137_593_568_809_893_332,
        0.149_451_349_150_580_593_145_776_339_657_697,
        0.219_086_362_515_982_043_995_534_934_228_163,
        0.269_266_719_309_996_355_091_226_921_569_469,
        0.295_524_224_714_752_870_173_892_994_651_338,
    ],
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
    resabs: f64,
}

/// How non-finite integrand values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NonFinite {
    Fail,
    Drop,
}

impl Rule {
    /// Apply the rule on `[lower, upper]`.
    pub(crate) fn apply(
        &self,
        f: &impl Fn(f64) -> f64,
        lower: f64,
        upper: f64,
        non_finite: NonFinite,
    ) -> Result<Segment, IntegrationError> {
        let center = 0.5 * (lower + upper);
        let half = 0.5 * (upper - lower);
        let last = self.xgk.len() - 1;

        let mut dropped = false;
        let mut largest = 0.0_f64;
        let mut sample = |x: f64| -> Result<f64, IntegrationError> {
            let y = f(x);
            if y.is_finite() {
                largest = largest.max(y.abs());
                Ok(y)
            } else if non_finite == NonFinite::Drop {
                dropped = true;
                Ok(0.0)
            } else {
                Err(IntegrationError::NonFinite { at: x })
            }
        };

        let mut fv1 = [0.0; 10];
        let mut fv2 = [0.0; 10];

        let fc = sample(center)?;
        let mut resk = fc * self.wgk[last];
        let mut resg = if last % 2 == 1 {
            fc * self.wg[last / 2]
        } else {
            0.0
        };
        let mut resabs = resk.abs();

        for j in 0..last {
            let dx = half * self.xgk[j];
            let f1 = sample(center - dx)?;
            let f2 = sample(center + dx)?;
            fv1[j] = f1;
            fv2[j] = f2;
            resk += self.wgk[j] * (f1 + f2);
            if j % 2 == 1 {
                resg += self.wg[j / 2] * (f1 + f2);
            }
            resabs += self.wgk[j] * (f1.abs() + f2.abs());
        }

        let mean = 0.5 * resk;
        let mut resasc = self.wgk[last] * (fc - mean).abs();
        for j in 0..last {
            resasc += self.wgk[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
        }

        let value = resk * half;
        let resabs = resabs * half.abs();
        let resasc = resasc * half.abs();
        let mut error = ((resk - resg) * half).abs();

        if resasc != 0.0 && error != 0.0 {
            error = resasc * (200.0 * error / resasc).powf(1.5).min(1.0);
        }
        if resabs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
            error = error.max(50.0 * f64::EPSILON * resabs);
        }
        if dropped {
            error = error.max((upper - lower).abs() * largest);
        }

        Ok(Segment {
            lower,
            upper,
            value,
            error,
            resabs,
        })
    }
}

/// Estimate on a single interval for the doubly adaptive scheme: the 15-point
/// rule, and if that is not accurate enough on its own, the 21-point rule.
fn escalate(
    f: &impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    settings: &Settings,
) -> Result<Segment, IntegrationError> {
    let low = GK15.apply(f, lower, upper, NonFinite::Drop)?;
    if low.error <= settings.tolerance(low.value) {
        return Ok(low);
    }
    let high = GK21.apply(f, lower, upper, NonFinite::Drop)?;
    Ok(if high.error < low.error { high } else { low })
}

fn adaptive(
    lower: f64,
    upper: f64,
    settings: &Settings,
    estimate: impl Fn(f64, f64) -> Result<Segment, IntegrationError>,
) -> Result<Estimate, IntegrationError> {
    let mut segments = vec![estimate(lower, upper)?];

    loop {
        let value: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        let resabs: f64 = segments.iter().map(|s| s.resabs).sum();

        if !value.is_finite() {
            return Err(IntegrationError::NonFinite {
                at: 0.5 * (lower + upper),
            });
        }
        if error <= settings.tolerance(value).max(50.0 * f64::EPSILON * resabs) {
            log::debug!(
                "Integration on [{lower}, {upper}] converged with {} intervals",
                segments.len()
            );
            return Ok(Estimate { value, error });
        }
        if segments.len() >= settings.space {
            return Err(IntegrationError::SubdivisionLimit {
                intervals: segments.len(),
                value,
                error,
            });
        }

        let (index, _) = segments
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(i, e), (j, s)| {
                if s.error > e {
                    (j, s.error)
                } else {
                    (i, e)
                }
            });
        let worst = segments.swap_remove(index);
        let mid = 0.5 * (worst.lower + worst.upper);
        if mid <= worst.lower || mid >= worst.upper {
            return Err(IntegrationError::Roundoff { value, error });
        }

        segments.push(estimate(worst.lower, mid)?);
        segments.push(estimate(mid, worst.upper)?);
    }
}

/// Globally adaptive 7/15-point Gauss-Kronrod quadrature on a finite interval.
pub fn qag(
    f: impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    settings: &Settings,
) -> Result<Estimate, IntegrationError> {
    adaptive(lower, upper, settings, |a, b| {
        GK15.apply(&f, a, b, NonFinite::Fail)
    })
}

/// Doubly adaptive quadrature on a finite interval: the degree of the rule is
/// raised before an interval is bisected, and non-finite values are dropped.
pub fn cquad(
    f: impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    settings: &Settings,
) -> Result<Estimate, IntegrationError> {
    adaptive(lower, upper, settings, |a, b| escalate(&f, a, b, settings))
}
