//! Built-in ISO/IEC 27001:2022 workpaper templates.

use crate::catalog::{ANNEX_A_SECTIONS, MAIN_CLAUSES};
use crate::enums::CategoryGroup;

use super::{TemplateCategory, WorkpaperTemplateDefinition};

pub const ISO27001_2022_TEMPLATE_ID: &str = "iso27001-2022";
pub const ISO27001_2022_SURVEILLANCE_TEMPLATE_ID: &str = "iso27001-2022-surveillance";
pub const ISO27001_2022_ANNEX_A_TEMPLATE_ID: &str = "iso27001-2022-annex-a";

const TEMPLATE_VERSION: &str = "2022.1";

struct CategorySeed {
    id: &'static str,
    name: &'static str,
    display_name: &'static str,
    group: CategoryGroup,
    /// Clause or Annex A section number whose children become the category clauses.
    section: &'static str,
    description: &'static str,
    scope: &'static str,
    objectives: &'static str,
    audit_procedure: &'static str,
}

const CTX_4: CategorySeed = CategorySeed {
    id: "ctx-4",
    name: "Context",
    display_name: "Context of the Organization",
    group: CategoryGroup::MainClauses,
    section: "4",
    description: "Internal and external issues, interested parties, and ISMS scope.",
    scope: "Organizational context analysis, interested-party register, and the documented ISMS scope statement.",
    objectives: "Confirm the organization has determined the issues and interested parties relevant to its ISMS and defined a scope consistent with them.",
    audit_procedure: "Inspect the context analysis and interested-party register; trace scope boundaries and exclusions to documented justification; interview the ISMS owner.",
};

const LEADERSHIP_5: CategorySeed = CategorySeed {
    id: "leadership-5",
    name: "Leadership",
    display_name: "Leadership",
    group: CategoryGroup::MainClauses,
    section: "5",
    description: "Top management commitment, information security policy, and roles.",
    scope: "Management commitment evidence, the information security policy, and the assignment of ISMS roles and authorities.",
    objectives: "Verify top management demonstrates leadership of the ISMS, an approved policy exists and is communicated, and responsibilities are assigned.",
    audit_procedure: "Review the approved policy and its communication records; sample management meeting minutes; inspect role descriptions and appointment letters.",
};

const PLANNING_6: CategorySeed = CategorySeed {
    id: "planning-6",
    name: "Planning",
    display_name: "Planning",
    group: CategoryGroup::MainClauses,
    section: "6",
    description: "Risk assessment and treatment planning, objectives, and planning of changes.",
    scope: "Risk assessment methodology, risk treatment plan, Statement of Applicability, and security objectives.",
    objectives: "Confirm risks and opportunities are assessed with a repeatable method and treatment decisions are traceable to the Statement of Applicability.",
    audit_procedure: "Walk through the risk methodology; reperform a sample of risk ratings; reconcile the treatment plan to the Statement of Applicability; check objectives are measurable.",
};

const SUPPORT_7: CategorySeed = CategorySeed {
    id: "support-7",
    name: "Support",
    display_name: "Support",
    group: CategoryGroup::MainClauses,
    section: "7",
    description: "Resources, competence, awareness, communication, and documented information.",
    scope: "Resourcing, competence records, awareness programme, communication plan, and document control.",
    objectives: "Verify the ISMS is resourced, staff are competent and aware, and documented information is controlled.",
    audit_procedure: "Sample training and competence records; inspect awareness campaign evidence; test document control on a sample of ISMS documents.",
};

const OPERATION_8: CategorySeed = CategorySeed {
    id: "operation-8",
    name: "Operation",
    display_name: "Operation",
    group: CategoryGroup::MainClauses,
    section: "8",
    description: "Operational planning and control, risk assessment, and risk treatment execution.",
    scope: "Operational controls, planned-interval risk assessments, and implementation of the risk treatment plan.",
    objectives: "Confirm processes are operated as planned and risk assessments and treatments are performed at planned intervals.",
    audit_procedure: "Inspect the latest risk assessment results; trace a sample of treatment actions to implementation evidence; review change records for operational impact.",
};

const PERFORMANCE_9: CategorySeed = CategorySeed {
    id: "performance-9",
    name: "Performance Evaluation",
    display_name: "Performance Evaluation",
    group: CategoryGroup::MainClauses,
    section: "9",
    description: "Monitoring and measurement, internal audit, and management review.",
    scope: "Security metrics, the internal audit programme, and management review outputs.",
    objectives: "Verify ISMS performance is measured, internal audits are planned and performed, and management reviews the ISMS at planned intervals.",
    audit_procedure: "Review the metrics catalogue and recent results; inspect the internal audit programme and reports; examine management review minutes for required inputs and outputs.",
};

const IMPROVEMENT_10: CategorySeed = CategorySeed {
    id: "improvement-10",
    name: "Improvement",
    display_name: "Improvement",
    group: CategoryGroup::MainClauses,
    section: "10",
    description: "Continual improvement, nonconformity handling, and corrective action.",
    scope: "Nonconformity log, corrective action records, and improvement initiatives.",
    objectives: "Confirm nonconformities are recorded, root causes are analysed, and corrective actions are implemented and checked for effectiveness.",
    audit_procedure: "Sample nonconformities from the log; trace each to root cause analysis and corrective action; verify effectiveness reviews were performed.",
};

const ORG_CONTROLS_A5: CategorySeed = CategorySeed {
    id: "org-controls-a5",
    name: "Organizational Controls",
    display_name: "Organizational Controls (A.5)",
    group: CategoryGroup::AnnexAControls,
    section: "A.5",
    description: "Policies, asset management, access control, supplier, incident, and compliance controls.",
    scope: "Annex A.5 organizational controls marked applicable in the Statement of Applicability.",
    objectives: "Verify applicable organizational controls are designed and operating effectively.",
    audit_procedure: "For each applicable A.5 control, inspect the governing procedure and test a sample of operating evidence against it.",
};

const PEOPLE_CONTROLS_A6: CategorySeed = CategorySeed {
    id: "people-controls-a6",
    name: "People Controls",
    display_name: "People Controls (A.6)",
    group: CategoryGroup::AnnexAControls,
    section: "A.6",
    description: "Screening, employment terms, awareness, disciplinary process, and remote working.",
    scope: "Annex A.6 people controls across the employee lifecycle.",
    objectives: "Verify personnel security controls apply before, during, and after employment.",
    audit_procedure: "Sample joiners and leavers; inspect screening evidence, signed agreements, and termination checklists; review remote working arrangements.",
};

const PHYSICAL_CONTROLS_A7: CategorySeed = CategorySeed {
    id: "physical-controls-a7",
    name: "Physical Controls",
    display_name: "Physical Controls (A.7)",
    group: CategoryGroup::AnnexAControls,
    section: "A.7",
    description: "Perimeters, entry, equipment protection, media, and secure disposal.",
    scope: "Annex A.7 physical controls at in-scope sites and for off-premises equipment.",
    objectives: "Verify physical and environmental controls protect information processing facilities and equipment.",
    audit_procedure: "Walk through in-scope facilities; inspect access logs and visitor records; sample equipment maintenance and disposal certificates.",
};

const TECH_CONTROLS_A8: CategorySeed = CategorySeed {
    id: "tech-controls-a8",
    name: "Technological Controls",
    display_name: "Technological Controls (A.8)",
    group: CategoryGroup::AnnexAControls,
    section: "A.8",
    description: "Endpoint, access, vulnerability, logging, network, cryptography, and secure development controls.",
    scope: "Annex A.8 technological controls for in-scope systems and environments.",
    objectives: "Verify technological controls are configured and operating effectively across in-scope systems.",
    audit_procedure: "Inspect system configurations against baselines; sample privileged access reviews, vulnerability scans, and backup restores; review secure development evidence.",
};

/// Clause numbers under a section, in catalog order, and the range label.
fn section_clauses(section: &str) -> (Vec<String>, Option<String>) {
    let numbers: Vec<&str> = MAIN_CLAUSES
        .iter()
        .filter(|c| c.number == section)
        .flat_map(|c| c.subclauses.iter().map(|(n, _)| *n))
        .chain(
            ANNEX_A_SECTIONS
                .iter()
                .filter(|s| s.number == section)
                .flat_map(|s| s.controls.iter().map(|(n, _)| *n)),
        )
        .collect();

    let range = match (numbers.first(), numbers.last()) {
        (Some(first), Some(last)) if first != last => Some(format!("{first}-{last}")),
        (Some(only), _) => Some((*only).to_string()),
        _ => None,
    };

    (numbers.into_iter().map(str::to_string).collect(), range)
}

fn category(seed: &CategorySeed, is_required: bool) -> TemplateCategory {
    let (clauses, clause_range) = section_clauses(seed.section);
    TemplateCategory {
        id: seed.id.to_string(),
        name: seed.name.to_string(),
        display_name: seed.display_name.to_string(),
        group: seed.group,
        clauses,
        clause_range,
        is_required,
        description: Some(seed.description.to_string()),
        scope: seed.scope.to_string(),
        objectives: seed.objectives.to_string(),
        audit_procedure: seed.audit_procedure.to_string(),
    }
}

pub(super) fn templates() -> Vec<WorkpaperTemplateDefinition> {
    vec![
        WorkpaperTemplateDefinition {
            id: ISO27001_2022_TEMPLATE_ID.to_string(),
            name: "ISO 27001:2022 Certification Audit".to_string(),
            description: "Full certification audit covering management clauses 4-10 and the Annex A control themes.".to_string(),
            version: Some(TEMPLATE_VERSION.to_string()),
            categories: vec![
                category(&CTX_4, true),
                category(&LEADERSHIP_5, false),
                category(&PLANNING_6, false),
                category(&SUPPORT_7, false),
                category(&OPERATION_8, false),
                category(&PERFORMANCE_9, false),
                category(&IMPROVEMENT_10, false),
                category(&ORG_CONTROLS_A5, false),
                category(&PEOPLE_CONTROLS_A6, false),
                category(&PHYSICAL_CONTROLS_A7, false),
                category(&TECH_CONTROLS_A8, false),
            ],
        },
        WorkpaperTemplateDefinition {
            id: ISO27001_2022_SURVEILLANCE_TEMPLATE_ID.to_string(),
            name: "ISO 27001:2022 Surveillance Audit".to_string(),
            description: "Annual surveillance audit focused on leadership, performance evaluation, and improvement.".to_string(),
            version: Some(TEMPLATE_VERSION.to_string()),
            categories: vec![
                category(&LEADERSHIP_5, true),
                category(&OPERATION_8, false),
                category(&PERFORMANCE_9, true),
                category(&IMPROVEMENT_10, true),
                category(&ORG_CONTROLS_A5, false),
                category(&TECH_CONTROLS_A8, false),
            ],
        },
        WorkpaperTemplateDefinition {
            id: ISO27001_2022_ANNEX_A_TEMPLATE_ID.to_string(),
            name: "Annex A Controls Assessment".to_string(),
            description: "Control effectiveness assessment across the four Annex A themes.".to_string(),
            version: Some(TEMPLATE_VERSION.to_string()),
            categories: vec![
                category(&ORG_CONTROLS_A5, true),
                category(&PEOPLE_CONTROLS_A6, false),
                category(&PHYSICAL_CONTROLS_A7, false),
                category(&TECH_CONTROLS_A8, true),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn main_clause_category_covers_subclauses() {
        let cat = category(&CTX_4, true);
        assert_eq!(cat.clauses, vec!["4.1", "4.2", "4.3", "4.4"]);
        assert_eq!(cat.clause_range.as_deref(), Some("4.1-4.4"));
    }

    #[test]
    fn annex_category_covers_controls() {
        let cat = category(&PEOPLE_CONTROLS_A6, false);
        assert_eq!(cat.clauses.len(), 8);
        assert_eq!(cat.clause_range.as_deref(), Some("A.6.1-A.6.8"));
    }

    #[test]
    fn template_order_is_stable() {
        let ids: Vec<String> = templates().into_iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                ISO27001_2022_TEMPLATE_ID,
                ISO27001_2022_SURVEILLANCE_TEMPLATE_ID,
                ISO27001_2022_ANNEX_A_TEMPLATE_ID,
            ]
        );
    }
}
