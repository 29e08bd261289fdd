//! Value types of well-known Relion metadata labels.
//!
//! Relion declares a fixed type for each label, while the STAR format itself
//! is untyped. Inference alone mistypes columns such as `rlnDefocusU` when the
//! first value happens to be written without a decimal point, so the parser can
//! take these types as hints (see `ParseOptions::relion`).

use crate::core::models::table::normalize_label;
use crate::core::models::value::ColumnType;
use phf::phf_map;

static RELION_LABELS: phf::Map<&'static str, ColumnType> = phf_map! {
    // Images and micrographs
    "rlnImageName" => ColumnType::Str,
    "rlnImageOriginalName" => ColumnType::Str,
    "rlnMicrographName" => ColumnType::Str,
    "rlnMicrographNameNoDW" => ColumnType::Str,
    "rlnMicrographMovieName" => ColumnType::Str,
    "rlnMicrographMetadata" => ColumnType::Str,
    "rlnReferenceImage" => ColumnType::Str,
    "rlnMaskName" => ColumnType::Str,
    "rlnCtfImage" => ColumnType::Str,
    "rlnImageSize" => ColumnType::Int,
    "rlnImageDimensionality" => ColumnType::Int,
    "rlnMovieFrameNumber" => ColumnType::Int,
    "rlnMicrographId" => ColumnType::Int,

    // Optics
    "rlnOpticsGroup" => ColumnType::Int,
    "rlnOpticsGroupName" => ColumnType::Str,
    "rlnMtfFileName" => ColumnType::Str,
    "rlnVoltage" => ColumnType::Float,
    "rlnSphericalAberration" => ColumnType::Float,
    "rlnAmplitudeContrast" => ColumnType::Float,
    "rlnImagePixelSize" => ColumnType::Float,
    "rlnMicrographPixelSize" => ColumnType::Float,
    "rlnMicrographOriginalPixelSize" => ColumnType::Float,
    "rlnDetectorPixelSize" => ColumnType::Float,
    "rlnMagnification" => ColumnType::Float,
    "rlnBeamTiltX" => ColumnType::Float,
    "rlnBeamTiltY" => ColumnType::Float,
    "rlnBeamTiltClass" => ColumnType::Int,
    "rlnCtfDataAreCtfPremultiplied" => ColumnType::Int,

    // CTF
    "rlnDefocusU" => ColumnType::Float,
    "rlnDefocusV" => ColumnType::Float,
    "rlnDefocusAngle" => ColumnType::Float,
    "rlnCtfAstigmatism" => ColumnType::Float,
    "rlnCtfBfactor" => ColumnType::Float,
    "rlnCtfScalefactor" => ColumnType::Float,
    "rlnCtfFigureOfMerit" => ColumnType::Float,
    "rlnCtfMaxResolution" => ColumnType::Float,
    "rlnPhaseShift" => ColumnType::Float,
    "rlnCtfPhaseShift" => ColumnType::Float,

    // Particles
    "rlnCoordinateX" => ColumnType::Float,
    "rlnCoordinateY" => ColumnType::Float,
    "rlnCoordinateZ" => ColumnType::Float,
    "rlnOriginX" => ColumnType::Float,
    "rlnOriginY" => ColumnType::Float,
    "rlnOriginXAngst" => ColumnType::Float,
    "rlnOriginYAngst" => ColumnType::Float,
    "rlnAngleRot" => ColumnType::Float,
    "rlnAngleTilt" => ColumnType::Float,
    "rlnAnglePsi" => ColumnType::Float,
    "rlnAutopickFigureOfMerit" => ColumnType::Float,
    "rlnClassNumber" => ColumnType::Int,
    "rlnGroupNumber" => ColumnType::Int,
    "rlnGroupName" => ColumnType::Str,
    "rlnRandomSubset" => ColumnType::Int,
    "rlnHelicalTubeID" => ColumnType::Int,
    "rlnNormCorrection" => ColumnType::Float,
    "rlnLogLikelihood" => ColumnType::Float,
    "rlnMaxValueProbDistribution" => ColumnType::Float,
    "rlnNrOfSignificantSamples" => ColumnType::Int,
    "rlnParticleSelectZScore" => ColumnType::Float,

    // Model and optimiser
    "rlnIterationNumber" => ColumnType::Int,
    "rlnClassDistribution" => ColumnType::Float,
    "rlnAccuracyRotations" => ColumnType::Float,
    "rlnAccuracyTranslations" => ColumnType::Float,
    "rlnAccuracyTranslationsAngst" => ColumnType::Float,
    "rlnEstimatedResolution" => ColumnType::Float,
    "rlnAveragePmax" => ColumnType::Float,
    "rlnSpectralIndex" => ColumnType::Int,
    "rlnResolution" => ColumnType::Float,
    "rlnAngstromResolution" => ColumnType::Float,
    "rlnResolutionSquared" => ColumnType::Float,
    "rlnGoldStandardFsc" => ColumnType::Float,
    "rlnSsnrMap" => ColumnType::Float,
    "rlnFinalResolution" => ColumnType::Float,
    "rlnBfactorUsedForSharpening" => ColumnType::Float,
};

/// Returns the declared type of a Relion label, with or without the leading `_`.
pub fn lookup(label: &str) -> Option<ColumnType> {
    RELION_LABELS.get(normalize_label(label)).copied()
}

pub fn is_known(label: &str) -> bool {
    lookup(label).is_some()
}

/// Iterates over every registered label and its type, in no particular order.
pub fn all() -> impl Iterator<Item = (&'static str, ColumnType)> {
    RELION_LABELS.entries().map(|(label, kind)| (*label, *kind))
}
