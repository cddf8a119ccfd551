// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class labels produced by the civic-infrastructure classifier

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// One of the six categories the classifier was trained on.
///
/// The declaration order is the positional order of the model's output
/// vector, so `ClassLabel::ALL[i]` names the score at index `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassLabel {
    Garbage,
    OpenManhole,
    Potholes,
    RoadNormal,
    StreetlightBad,
    StreetlightGood,
}

impl ClassLabel {
    /// All labels in model output order
    pub const ALL: [ClassLabel; 6] = [
        ClassLabel::Garbage,
        ClassLabel::OpenManhole,
        ClassLabel::Potholes,
        ClassLabel::RoadNormal,
        ClassLabel::StreetlightBad,
        ClassLabel::StreetlightGood,
    ];

    /// Number of classes (length of every score vector)
    pub const COUNT: usize = Self::ALL.len();

    /// Wire name, as the model was trained with it
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Garbage => "garbage",
            ClassLabel::OpenManhole => "open_manhole",
            ClassLabel::Potholes => "potholes",
            ClassLabel::RoadNormal => "road_normal",
            ClassLabel::StreetlightBad => "streetlight bad",
            ClassLabel::StreetlightGood => "streetlight good",
        }
    }

    /// Human readable description for `/classes`
    pub fn description(&self) -> &'static str {
        match self {
            ClassLabel::Garbage => "Cardboard and other garbage items",
            ClassLabel::OpenManhole => "Open manholes on roads",
            ClassLabel::Potholes => "Road potholes",
            ClassLabel::RoadNormal => "Normal road conditions",
            ClassLabel::StreetlightBad => "Damaged/broken streetlights",
            ClassLabel::StreetlightGood => "Working streetlights",
        }
    }

    /// Label at a position of the score vector
    pub fn from_index(index: usize) -> Option<ClassLabel> {
        Self::ALL.get(index).copied()
    }

    /// Position of this label in the score vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wire names in model output order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.as_str()).collect()
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClassLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Label-keyed values that serialize as a JSON object in model output order
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<T>(Vec<(ClassLabel, T)>);

impl<T> LabelMap<T> {
    /// Pair every label with the value at the same position
    pub fn zip<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self(ClassLabel::ALL.iter().copied().zip(values).collect())
    }

    pub fn get(&self, label: ClassLabel) -> Option<&T> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ClassLabel, T)> {
        self.0.iter()
    }
}

impl<T: Serialize> Serialize for LabelMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label.as_str(), value)?;
        }
        map.end()
    }
}
