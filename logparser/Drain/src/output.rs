use std::collections::HashMap;
use std::path::Path;

use csv::Writer;
use md5::{Digest, Md5};
use regex::Regex;
use serde::Serialize;

use crate::cluster::LogCluster;
use crate::error::Result;
use crate::format::LogTable;
use crate::template::WILDCARD;

/// Short stable id of a template: first 8 hex chars of its MD5
pub fn template_id(template: &str) -> String {
    format!("{:x}", Md5::digest(template.as_bytes()))[..8].to_string()
}

/// Recovers the values hidden behind the wildcards of a template by
/// aligning it with the original content.
#[derive(Debug)]
pub struct ParameterExtractor {
    placeholder: Regex,
    spaces: Regex,
    cache: HashMap<String, Option<Regex>>,
}

impl ParameterExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            placeholder: Regex::new(r"<[^<>]{1,5}>")?,
            spaces: Regex::new(" +")?,
            cache: HashMap::new(),
        })
    }

    /// Wildcard values of `content` under `template`; empty when the template
    /// has no wildcards or doesn't fit the content.
    pub fn extract(&mut self, content: &str, template: &str) -> Result<Vec<String>> {
        if !self.cache.contains_key(template) {
            let compiled = self.compile(template)?;
            self.cache.insert(template.to_string(), compiled);
        }
        let Some(Some(re)) = self.cache.get(template) else {
            return Ok(vec![]);
        };

        Ok(match re.captures(content) {
            Some(caps) => caps
                .iter()
                .skip(1)
                .filter_map(|c| c.map(|m| m.as_str().to_string()))
                .collect(),
            None => vec![],
        })
    }

    fn compile(&self, template: &str) -> Result<Option<Regex>> {
        let template = self.placeholder.replace_all(template, WILDCARD);
        if !template.contains(WILDCARD) {
            return Ok(None);
        }

        let pattern = template
            .split(WILDCARD)
            .map(|literal| {
                self.spaces
                    .replace_all(&regex::escape(literal), r"\s+")
                    .into_owned()
            })
            .collect::<Vec<_>>()
            .join("(.*?)");
        Ok(Some(Regex::new(&format!("^{pattern}$"))?))
    }
}

/// Write `<log>_structured.csv`: every input record with its event id,
/// template and (optionally) parameter list.
pub fn write_structured(
    path: impl AsRef<Path>,
    table: &LogTable,
    clusters: &[LogCluster],
    keep_parameters: bool,
) -> Result<()> {
    let mut log_templates: Vec<Option<(String, String)>> = vec![None; table.len()];
    for log_clust in clusters {
        let template_str = log_clust.template_str();
        let event_id = template_id(&template_str);
        for &line_id in log_clust.line_ids() {
            if let Some(slot) = line_id
                .checked_sub(1)
                .and_then(|idx| log_templates.get_mut(idx as usize))
            {
                *slot = Some((event_id.clone(), template_str.clone()));
            }
        }
    }

    let mut extractor = ParameterExtractor::new()?;
    let mut wtr = Writer::from_path(path.as_ref())?;

    let mut header = vec!["LineId"];
    header.extend(table.headers().iter().map(String::as_str));
    header.extend(["EventId", "EventTemplate"]);
    if keep_parameters {
        header.push("ParameterList");
    }
    wtr.write_record(&header)?;

    for (record, assigned) in table.records().iter().zip(&log_templates) {
        let (event_id, template) = match assigned {
            Some((id, template)) => (id.as_str(), template.as_str()),
            None => ("", ""),
        };

        let mut row = Vec::with_capacity(header.len());
        row.push(record.line_id.to_string());
        row.extend(record.fields.iter().cloned());
        row.push(event_id.to_string());
        row.push(template.to_string());
        if keep_parameters {
            let params = extractor.extract(table.content(record), template)?;
            row.push(params.join(", "));
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
struct Event {
    #[serde(rename = "EventId")]
    event_id: String,
    #[serde(rename = "EventTemplate")]
    event_template: String,
    #[serde(rename = "Occurrences")]
    occurrences: u64,
}

/// Write `<log>_templates.csv`: one row per distinct template, in order of
/// first appearance, with its total occurrence count.
pub fn write_templates(path: impl AsRef<Path>, clusters: &[LogCluster]) -> Result<()> {
    let mut wtr = Writer::from_path(path.as_ref())?;
    for event in collect_events(clusters) {
        wtr.serialize(event)?;
    }
    wtr.flush()?;
    Ok(())
}

fn collect_events(clusters: &[LogCluster]) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for log_clust in clusters {
        let template = log_clust.template_str();
        let occurrences = log_clust.size() as u64;
        match index.get(&template) {
            Some(&idx) => events[idx].occurrences += occurrences,
            None => {
                index.insert(template.clone(), events.len());
                events.push(Event {
                    event_id: template_id(&template),
                    event_template: template,
                    occurrences,
                });
            }
        }
    }

    events
}
