//! Directory of transplant-capable hospitals and the hospital the current
//! operator works at.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A hospital and its coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HospitalLocation {
  pub name:      &'static str,
  pub city:      &'static str,
  pub latitude:  f64,
  pub longitude: f64,
}

impl HospitalLocation {
  const fn new(
    name: &'static str,
    city: &'static str,
    latitude: f64,
    longitude: f64,
  ) -> Self {
    Self { name, city, latitude, longitude }
  }

  /// Great-circle distance to `other` in kilometres.
  pub fn distance_km(&self, other: &HospitalLocation) -> f64 {
    let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (other.longitude - self.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
      + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
  }
}

#[rustfmt::skip]
static HOSPITALS: &[HospitalLocation] = &[
  HospitalLocation::new("УМБАЛ Александровска - София", "София", 42.6977, 23.3219),
  HospitalLocation::new("МБАЛ Св. Анна - София", "София", 42.6886, 23.3190),
  HospitalLocation::new("УМБАЛ Царица Йоанна - ИСУЛ - София", "София", 42.6860, 23.3320),
  HospitalLocation::new("УМБАЛ Св. Иван Рилски - София", "София", 42.6520, 23.3760),
  HospitalLocation::new("УМБАЛ Св. Георги - София", "София", 42.6950, 23.3340),
  HospitalLocation::new("МБАЛ Национална кардиологична болница - София", "София", 42.6820, 23.3140),
  HospitalLocation::new("УМБАЛ Софиямед - София", "София", 42.6630, 23.3350),
  HospitalLocation::new("СБАЛАГ Майчин дом - София", "София", 42.6970, 23.3410),
  HospitalLocation::new("Военномедицинска академия - София", "София", 42.6800, 23.3630),
  HospitalLocation::new("УМБАЛ Токуда Болница - София", "София", 42.6820, 23.2730),
  HospitalLocation::new("Първа МБАЛ София АД - София", "София", 42.6840, 23.3250),
  HospitalLocation::new("Национален кардиологичен център - София", "София", 42.6820, 23.3140),
  HospitalLocation::new("Национална онкологична болница - София", "София", 42.6900, 23.3500),
  HospitalLocation::new("СБАЛ по нефрология - София", "София", 42.6750, 23.3450),
  HospitalLocation::new("СБАЛ по пневмология и фтизиатрия - София", "София", 42.6680, 23.3280),

  HospitalLocation::new("УМБАЛ Св. Георги - Пловдив", "Пловдив", 42.1354, 24.7453),
  HospitalLocation::new("УМБАЛ Пулмед - Пловдив", "Пловдив", 42.1500, 24.7500),
  HospitalLocation::new("МБАЛ Св. Пантелеймон - Пловдив", "Пловдив", 42.1420, 24.7480),
  HospitalLocation::new("УМБАЛ Каспела - Пловдив", "Пловдив", 42.1380, 24.7520),

  HospitalLocation::new("МБАЛ Св. Анна - Варна", "Варна", 43.2141, 27.9147),
  HospitalLocation::new("УМБАЛ Св. Марина - Варна", "Варна", 43.2044, 27.9120),
  HospitalLocation::new("УМБАЛ Медика - Варна", "Варна", 43.2070, 27.9200),

  HospitalLocation::new("УМБАЛ Бургас АД - Бургас", "Бургас", 42.5048, 27.4626),
  HospitalLocation::new("МБАЛ Бургасмед - Бургас", "Бургас", 42.5000, 27.4650),
  HospitalLocation::new("МБАЛ Св. Анна - Бургас", "Бургас", 42.5020, 27.4600),

  HospitalLocation::new("УМБАЛ Канев - Русе", "Русе", 43.8486, 25.9656),
  HospitalLocation::new("УМБАЛ Медика - Русе", "Русе", 43.8520, 25.9700),

  HospitalLocation::new("УМБАЛ Проф. д-р Стоян Киркович - Стара Загора", "Стара Загора", 42.4258, 25.6342),
  HospitalLocation::new("МБАЛ Тракия - Стара Загора", "Стара Загора", 42.4300, 25.6400),

  HospitalLocation::new("УМБАЛ Д-р Георги Странски - Плевен", "Плевен", 43.4170, 24.6167),
  HospitalLocation::new("МБАЛ Сърце и Мозък - Плевен", "Плевен", 43.4200, 24.6200),

  HospitalLocation::new("МБАЛ Св. Дух - Благоевград", "Благоевград", 42.0116, 23.0942),
  HospitalLocation::new("МБАЛ Д-р Стефан Черкезов - Велико Търново", "Велико Търново", 43.0757, 25.6172),
  HospitalLocation::new("УМБАЛ Д-р Панчо Владигеров - Шумен", "Шумен", 43.2750, 26.9300),
  HospitalLocation::new("МБАЛ Д-р Иван Селимински - Сливен", "Сливен", 42.6824, 26.3150),
  HospitalLocation::new("МБАЛ Добрич АД - Добрич", "Добрич", 43.5725, 27.8277),
  HospitalLocation::new("МБАЛ Рахила Ангелова - Перник", "Перник", 42.6060, 23.0301),
  HospitalLocation::new("МБАЛ Св. Пантелеймон - Ямбол", "Ямбол", 42.4842, 26.5036),
  HospitalLocation::new("МБАЛ Хасково - Хасково", "Хасково", 41.9344, 25.5553),
  HospitalLocation::new("МБАЛ Пазарджик - Пазарджик", "Пазарджик", 42.1887, 24.3332),
  HospitalLocation::new("МБАЛ Д-р Тота Венкова - Габрово", "Габрово", 42.8747, 25.3188),
  HospitalLocation::new("МБАЛ Д-р Никола Василиев - Кюстендил", "Кюстендил", 42.2858, 22.6894),
  HospitalLocation::new("МБАЛ Кърджали - Кърджали", "Кърджали", 41.6483, 25.3678),
  HospitalLocation::new("МБАЛ Д-р Братан Шукеров - Смолян", "Смолян", 41.5771, 24.7010),
  HospitalLocation::new("МБАЛ Св. Иван Рилски - Разград", "Разград", 43.5269, 26.5175),
  HospitalLocation::new("МБАЛ Силистра - Силистра", "Силистра", 44.1172, 27.2606),
  HospitalLocation::new("МБАЛ Търговище - Търговище", "Търговище", 43.2467, 26.5697),
  HospitalLocation::new("МБАЛ Проф. д-р Параскев Стоянов - Ловеч", "Ловеч", 43.1370, 24.7140),
  HospitalLocation::new("МБАЛ д-р Стамен Илиев - Монтана", "Монтана", 43.4092, 23.2258),
  HospitalLocation::new("МБАЛ Света Петка - Видин", "Видин", 43.9859, 22.8778),
  HospitalLocation::new("МБАЛ Христо Ботев - Враца", "Враца", 43.2103, 23.5489),
];

/// Every hospital in the directory.
pub fn all() -> &'static [HospitalLocation] { HOSPITALS }

/// Look up a hospital by its exact name, ignoring surrounding whitespace.
pub fn find(name: &str) -> Option<&'static HospitalLocation> {
  let name = name.trim();
  HOSPITALS.iter().find(|h| h.name == name)
}

/// Hospitals in `city`. City names compare exactly after trimming.
pub fn in_city(city: &str) -> impl Iterator<Item = &'static HospitalLocation> + '_ {
  let city = city.trim();
  HOSPITALS.iter().filter(move |h| h.city == city)
}

/// Distinct city names, in directory order.
pub fn cities() -> Vec<&'static str> {
  let mut out: Vec<&'static str> = Vec::new();
  for h in HOSPITALS {
    if !out.contains(&h.city) {
      out.push(h.city);
    }
  }
  out
}

// ─── Context ─────────────────────────────────────────────────────────────────

/// The hospital on whose behalf operations run. Passed explicitly to anything
/// that distinguishes "our" organs and requests from everyone else's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalContext {
  name: String,
}

impl HospitalContext {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into().trim().to_owned() }
  }

  pub fn name(&self) -> &str { &self.name }

  /// Directory entry for this hospital, if it is listed.
  pub fn location(&self) -> Option<&'static HospitalLocation> { find(&self.name) }

  /// Whether `hospital` names this hospital.
  pub fn is(&self, hospital: &str) -> bool { hospital.trim() == self.name }

  /// Distance from this hospital to `other`, when both are in the directory.
  pub fn distance_to(&self, other: &str) -> Option<f64> {
    Some(self.location()?.distance_km(find(other)?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_are_unique() {
    let mut names: Vec<_> = all().iter().map(|h| h.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), all().len());
  }

  #[test]
  fn lookup_by_name_and_city() {
    let h = find(" УМБАЛ Канев - Русе ").unwrap();
    assert_eq!(h.city, "Русе");
    assert!(find("St. Elsewhere").is_none());

    assert_eq!(in_city("Варна").count(), 3);
    assert!(in_city("Атлантида").next().is_none());
    assert_eq!(cities().first(), Some(&"София"));
  }

  #[test]
  fn sofia_to_plovdiv_is_about_130_km() {
    let sofia = find("УМБАЛ Александровска - София").unwrap();
    let plovdiv = find("УМБАЛ Св. Георги - Пловдив").unwrap();
    let d = sofia.distance_km(plovdiv);
    assert!((125.0..140.0).contains(&d), "{d}");
    assert_eq!(sofia.distance_km(sofia), 0.0);
  }

  #[test]
  fn context_compares_trimmed_names() {
    let ctx = HospitalContext::new("  УМБАЛ Медика - Варна ");
    assert_eq!(ctx.name(), "УМБАЛ Медика - Варна");
    assert!(ctx.is("УМБАЛ Медика - Варна "));
    assert!(!ctx.is("УМБАЛ Медика - Русе"));
    assert!(ctx.location().is_some());
    assert!(ctx.distance_to("Nowhere").is_none());
    assert!(ctx.distance_to("МБАЛ Св. Анна - Варна").unwrap() < 5.0);
  }
}
