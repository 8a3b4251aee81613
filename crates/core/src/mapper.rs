//! Bundle to patient record mapping.
//!
//! Search results are mapped into a flat, client-side patient model. Entries that do
//! not hold a Patient resource are skipped without error: searches are scoped on the
//! server, but bundles may still carry OperationOutcome entries or anything else.

use fhir::{Bundle, FhirDate, HumanName, Patient, Resource};
use std::fmt;

/// Simplified projection of a FHIR Patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    /// One record per name on the source resource, in source order.
    pub names: Vec<NameRecord>,

    /// Birth date exactly as the server reported it.
    pub birth_date: Option<FhirDate>,
}

/// One name of a patient.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameRecord {
    /// All non-null given names joined by single spaces. Never an empty string.
    pub first_name: Option<String>,

    /// Family name.
    pub last_name: Option<String>,
}

impl From<&HumanName> for NameRecord {
    fn from(name: &HumanName) -> Self {
        let given = name
            .given
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            first_name: (!given.is_empty()).then_some(given),
            last_name: name.family.clone(),
        }
    }
}

impl From<&Patient> for PatientRecord {
    fn from(patient: &Patient) -> Self {
        Self {
            names: patient.name.iter().map(NameRecord::from).collect(),
            birth_date: patient.birth_date,
        }
    }
}

/// Map every Patient entry of `bundle` to a [`PatientRecord`], preserving order.
pub fn map_bundle(bundle: &Bundle) -> Vec<PatientRecord> {
    bundle
        .resources()
        .filter_map(Resource::as_patient)
        .map(PatientRecord::from)
        .collect()
}

impl fmt::Display for NameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => write!(f, "{first} {last}"),
            (Some(first), None) => write!(f, "{first}"),
            (None, Some(last)) => write!(f, "{last}"),
            (None, None) => write!(f, "<unnamed>"),
        }
    }
}

impl fmt::Display for PatientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "names=[")?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "] birth_date=")?;
        match &self.birth_date {
            Some(date) => write!(f, "{date}"),
            None => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fhir::{BundleEntry, OperationOutcome, OperationOutcomeIssue};

    fn patient(given: Option<&str>, family: Option<&str>, birth_date: Option<&str>) -> Resource {
        Resource::Patient(Patient {
            id: None,
            name: vec![HumanName {
                use_type: None,
                family: family.map(str::to_string),
                given: vec![given.map(str::to_string)],
            }],
            birth_date: birth_date.map(|d| d.parse().expect("valid date")),
        })
    }

    fn outcome() -> Resource {
        Resource::OperationOutcome(OperationOutcome {
            issue: vec![OperationOutcomeIssue {
                severity: "information".into(),
                code: "informational".into(),
                diagnostics: Some("search ran".into()),
            }],
        })
    }

    #[test]
    fn maps_single_patient() {
        let bundle = Bundle::searchset([patient(Some("James"), Some("Smith"), Some("1985-03-12"))]);

        let records = map_bundle(&bundle);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].names.len(), 1);
        assert_eq!(records[0].names[0].first_name.as_deref(), Some("James"));
        assert_eq!(records[0].names[0].last_name.as_deref(), Some("Smith"));
        assert_eq!(
            records[0].birth_date.and_then(|d| d.as_naive_date()),
            NaiveDate::from_ymd_opt(1985, 3, 12)
        );
    }

    #[test]
    fn maps_every_combination_of_present_fields() {
        let cases = [
            (Some("James"), Some("Smith"), Some("1985-03-12")),
            (Some("Emma"), None, Some("1990-07-25")),
            (None, Some("Williams"), Some("1988-11-05")),
            (None, None, Some("1988-03-05")),
            (Some("Olivia"), Some("Brown"), None),
            (Some("Noah"), None, None),
            (None, Some("Garcia"), None),
            (None, None, None),
        ];

        for (first, last, born) in cases {
            let records = map_bundle(&Bundle::searchset([patient(first, last, born)]));

            assert_eq!(records.len(), 1);
            assert_eq!(records[0].names.len(), 1);
            assert_eq!(records[0].names[0].first_name.as_deref(), first);
            assert_eq!(records[0].names[0].last_name.as_deref(), last);
            assert_eq!(
                records[0].birth_date.map(|d| d.to_string()).as_deref(),
                born
            );
        }
    }

    #[test]
    fn empty_given_list_leaves_first_name_absent() {
        let bundle = Bundle::searchset([Resource::Patient(Patient {
            name: vec![HumanName::new(Vec::<String>::new(), Some("Smith"))],
            ..Patient::default()
        })]);

        let records = map_bundle(&bundle);
        assert_eq!(records[0].names[0].first_name, None);
        assert_eq!(records[0].names[0].last_name.as_deref(), Some("Smith"));
    }

    #[test]
    fn joins_given_names_and_skips_nulls() {
        let name = HumanName {
            use_type: Some("official".into()),
            family: Some("Smith".into()),
            given: vec![Some("James".into()), None, Some("Robert".into())],
        };
        assert_eq!(
            NameRecord::from(&name),
            NameRecord {
                first_name: Some("James Robert".into()),
                last_name: Some("Smith".into()),
            }
        );

        let only_nulls = HumanName {
            given: vec![None, None],
            ..HumanName::default()
        };
        assert_eq!(NameRecord::from(&only_nulls), NameRecord::default());
    }

    #[test]
    fn one_name_record_per_human_name() {
        let bundle = Bundle::searchset([Resource::Patient(Patient {
            name: vec![
                HumanName::new(["James", "Robert"], Some("Smith")),
                HumanName::new(["Jim"], None),
            ],
            ..Patient::default()
        })]);

        let records = map_bundle(&bundle);
        assert_eq!(
            records[0].names,
            vec![
                NameRecord {
                    first_name: Some("James Robert".into()),
                    last_name: Some("Smith".into()),
                },
                NameRecord {
                    first_name: Some("Jim".into()),
                    last_name: None,
                },
            ]
        );
    }

    #[test]
    fn patient_without_names_has_empty_names() {
        let bundle = Bundle::searchset([Resource::Patient(Patient::default())]);
        let records = map_bundle(&bundle);
        assert_eq!(records.len(), 1);
        assert!(records[0].names.is_empty());
        assert!(records[0].birth_date.is_none());
    }

    #[test]
    fn skips_non_patient_entries_and_keeps_order() {
        let mut bundle = Bundle::searchset([
            outcome(),
            patient(Some("Ada"), Some("Lovelace"), None),
            Resource::Unknown,
            patient(Some("Alan"), Some("Turing"), None),
            outcome(),
            patient(Some("Grace"), Some("Hopper"), None),
        ]);
        bundle.entry.insert(3, BundleEntry::default());

        let records = map_bundle(&bundle);

        let first_names: Vec<_> = records
            .iter()
            .map(|r| r.names[0].first_name.as_deref().unwrap())
            .collect();
        assert_eq!(first_names, vec!["Ada", "Alan", "Grace"]);
    }

    #[test]
    fn non_patient_only_bundle_maps_to_nothing() {
        assert!(map_bundle(&Bundle::searchset([outcome(), Resource::Unknown])).is_empty());
        assert!(map_bundle(&Bundle::default()).is_empty());
    }

    #[test]
    fn mapping_is_idempotent() {
        let bundle = Bundle::searchset([
            patient(Some("James"), Some("Smith"), Some("1985")),
            outcome(),
            patient(None, Some("Garcia"), Some("1990-07")),
        ]);

        assert_eq!(map_bundle(&bundle), map_bundle(&bundle));
    }

    #[test]
    fn malformed_birth_date_maps_as_unknown() {
        let bundle = Bundle::parse_json(
            r#"{"resourceType":"Bundle","type":"searchset","entry":[
                {"resource":{"resourceType":"Patient","name":[{"family":"Smith","given":["James"]}],
                    "birthDate":"1985-03-12"}},
                {"resource":{"resourceType":"Patient","name":[{"family":"Smith","given":["Ann"]}],
                    "birthDate":"1985-3-1"}}]}"#,
        )
        .expect("parse bundle");

        let lines: Vec<String> = map_bundle(&bundle).iter().map(|r| r.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "names=[James Smith] birth_date=1985-03-12",
                "names=[Ann Smith] birth_date=unknown",
            ]
        );
    }

    #[test]
    fn display_rendering() {
        let record = PatientRecord {
            names: vec![
                NameRecord {
                    first_name: Some("James Robert".into()),
                    last_name: Some("Smith".into()),
                },
                NameRecord {
                    first_name: None,
                    last_name: Some("Smith".into()),
                },
                NameRecord::default(),
            ],
            birth_date: Some(FhirDate::YearMonth(1985, 3)),
        };
        assert_eq!(
            record.to_string(),
            "names=[James Robert Smith, Smith, <unnamed>] birth_date=1985-03"
        );

        let unnamed = PatientRecord {
            names: vec![],
            birth_date: None,
        };
        assert_eq!(unnamed.to_string(), "names=[] birth_date=unknown");
    }
}
