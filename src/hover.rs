use crate::scale::format_percent;
use crate::types::HospitalWeek;
use serde::Serialize;

/// The side panel next to the map. Field names follow the page element ids
/// they populate; every field is the empty string while nothing is hovered.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct InfoPanel {
    pub hosp_head: String,
    pub hosp: String,
    pub totalbeds_head: String,
    pub totalbeds: String,
    pub occupied_head: String,
    pub occupied: String,
    pub percent_head: String,
    pub percent: String,
}

impl InfoPanel {
    fn for_record(record: &HospitalWeek) -> Self {
        InfoPanel {
            hosp_head: "Hospital Name".to_string(),
            hosp: record.hospital_name.clone(),
            totalbeds_head: "Avg. Total ICU Beds During Week".to_string(),
            totalbeds: record.total_icu_beds_7_day_avg.to_string(),
            occupied_head: "Avg. ICU Beds Occupied During Week".to_string(),
            occupied: record.icu_beds_used_7_day_avg.to_string(),
            percent_head: "Percent of ICU Beds Occupied".to_string(),
            percent: format_percent(record.icu_beds_used_pct_7_day_avg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverState {
    Idle,
    Hovered(HospitalWeek),
}

/// What a transition asks the page to do: the full panel contents plus
/// whether the hovered circle gets its highlight stroke.
#[derive(Debug, Clone, Serialize)]
pub struct PanelUpdate {
    pub panel: InfoPanel,
    pub highlight: Option<String>,
}

/// Single-pointer hover machine. Owns the currently hovered record; at most
/// one record is hovered, and entering another circle while hovered replaces
/// it directly with no intermediate idle frame.
#[derive(Debug, Default)]
pub struct HoverMachine {
    state: Option<HospitalWeek>,
}

impl HoverMachine {
    pub fn new() -> Self {
        HoverMachine::default()
    }

    pub fn state(&self) -> HoverState {
        match &self.state {
            Some(record) => HoverState::Hovered(record.clone()),
            None => HoverState::Idle,
        }
    }

    pub fn pointer_enter(&mut self, record: &HospitalWeek) -> PanelUpdate {
        self.state = Some(record.clone());
        PanelUpdate {
            panel: InfoPanel::for_record(record),
            highlight: Some(record.hospital_name.clone()),
        }
    }

    pub fn pointer_leave(&mut self) -> PanelUpdate {
        self.state = None;
        PanelUpdate { panel: InfoPanel::default(), highlight: None }
    }
}
