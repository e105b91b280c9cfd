//! Establishments (the reporting unit of the regulatory forms) and the
//! physical locations within them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, validate};

// ─── Establishment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Establishment {
  pub id:                   i64,
  pub name:                 String,
  pub street_address:       Option<String>,
  pub city:                 Option<String>,
  pub state:                Option<String>,
  pub zip_code:             Option<String>,
  pub industry_description: Option<String>,
  pub naics_code:           Option<String>,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEstablishment {
  pub name:                 String,
  #[serde(default)]
  pub street_address:       Option<String>,
  #[serde(default)]
  pub city:                 Option<String>,
  #[serde(default)]
  pub state:                Option<String>,
  #[serde(default)]
  pub zip_code:             Option<String>,
  #[serde(default)]
  pub industry_description: Option<String>,
  #[serde(default)]
  pub naics_code:           Option<String>,
}

impl NewEstablishment {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn validate(&self) -> Result<()> {
    validate::name(&self.name, "establishment name")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstablishmentPatch {
  pub name:                 Option<String>,
  pub street_address:       Option<String>,
  pub city:                 Option<String>,
  pub state:                Option<String>,
  pub zip_code:             Option<String>,
  pub industry_description: Option<String>,
  pub naics_code:           Option<String>,
}

impl EstablishmentPatch {
  pub fn apply(self, e: &mut Establishment) -> Result<()> {
    if let Some(name) = &self.name {
      validate::name(name, "establishment name")?;
    }
    if let Some(v) = self.name {
      e.name = v;
    }
    if let Some(v) = self.street_address {
      e.street_address = Some(v);
    }
    if let Some(v) = self.city {
      e.city = Some(v);
    }
    if let Some(v) = self.state {
      e.state = Some(v);
    }
    if let Some(v) = self.zip_code {
      e.zip_code = Some(v);
    }
    if let Some(v) = self.industry_description {
      e.industry_description = Some(v);
    }
    if let Some(v) = self.naics_code {
      e.naics_code = Some(v);
    }
    Ok(())
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub id:               i64,
  pub establishment_id: i64,
  pub name:             String,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub is_active:        bool,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input for creating a location. The establishment comes from the route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
  pub name:    String,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub city:    Option<String>,
  #[serde(default)]
  pub state:   Option<String>,
}

impl NewLocation {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn validate(&self) -> Result<()> {
    validate::name(&self.name, "location name")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationPatch {
  pub name:      Option<String>,
  pub address:   Option<String>,
  pub city:      Option<String>,
  pub state:     Option<String>,
  pub is_active: Option<bool>,
}

impl LocationPatch {
  pub fn apply(self, l: &mut Location) -> Result<()> {
    if let Some(name) = &self.name {
      validate::name(name, "location name")?;
    }
    if let Some(v) = self.name {
      l.name = v;
    }
    if let Some(v) = self.address {
      l.address = Some(v);
    }
    if let Some(v) = self.city {
      l.city = Some(v);
    }
    if let Some(v) = self.state {
      l.state = Some(v);
    }
    if let Some(v) = self.is_active {
      l.is_active = v;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patch_rejects_empty_name_without_mutating() {
    let now = Utc::now();
    let mut e = Establishment {
      id:                   1,
      name:                 "Plant 1".into(),
      street_address:       None,
      city:                 None,
      state:                None,
      zip_code:             None,
      industry_description: None,
      naics_code:           None,
      created_at:           now,
      updated_at:           now,
    };
    let patch = EstablishmentPatch {
      name: Some("".into()),
      city: Some("Toledo".into()),
      ..Default::default()
    };
    assert!(patch.apply(&mut e).is_err());
    assert_eq!(e.name, "Plant 1");
    assert_eq!(e.city, None);

    EstablishmentPatch { city: Some("Toledo".into()), ..Default::default() }
      .apply(&mut e)
      .unwrap();
    assert_eq!(e.city.as_deref(), Some("Toledo"));
  }
}
