//! The canonical LyN prediction coefficients

/// The eight `(c1, c2)` prediction coefficient pairs every LyN DSP stream
/// is encoded against.
///
/// LyN does not store per-file coefficients the way most GameCube ADPCM
/// containers do; the engine ships this fixed table and streams only
/// reference it by index. The values are the vgmstream-matching set.
pub const COEFFICIENT_PAIRS: [(i16, i16); 8] = [
    (0x04AB, -0x0313), // 04AB FCED
    (0x0789, -0x0121), // 0789 FEDF
    (0x09A2, -0x051B), // 09A2 FAE5
    (0x0C90, -0x053F), // 0C90 FAC1
    (0x084D, -0x055C), // 084D FAA4
    (0x0982, -0x0209), // 0982 FDF7
    (0x0AF6, -0x0506), // 0AF6 FAFA
    (0x0BE6, -0x040B), // 0BE6 FBF5
];
