use crate::model::enums::PathologyType;

/// One named grading/severity scale associated with a pathology (§4.2).
pub struct GradingScale {
    pub name: &'static str,
    /// Regex whose presence marks a HIGH-confidence, specific mention
    /// (e.g. "Fisher grade 3", "Hunt-Hess 2").
    pub pattern: &'static str,
}

/// Static per-pathology declaration: detection cues at two confidence tiers,
/// plus the symptom/procedure/complication sub-pattern sets and grading
/// scales consumed by the per-category extractors (§4.2).
pub struct PathologyProfile {
    pub pathology_type: PathologyType,
    pub display_name: &'static str,
    /// Primary detection patterns: disjunction defines membership at MEDIUM confidence.
    pub detection_patterns: &'static [&'static str],
    /// Indirect cues: membership at LOW confidence when nothing stronger matched.
    pub indirect_patterns: &'static [&'static str],
    pub symptom_patterns: &'static [&'static str],
    pub procedure_patterns: &'static [&'static str],
    pub complication_patterns: &'static [&'static str],
    pub grading_scales: &'static [GradingScale],
}

pub static CATALOGUE: &[PathologyProfile] = &[
    PathologyProfile {
        pathology_type: PathologyType::Sah,
        display_name: "subarachnoid hemorrhage",
        detection_patterns: &[
            r"(?i)subarachnoid\s+hemorrhage",
            r"(?i)\bsah\b",
            r"(?i)aneurysm(al)?\s+rupture",
            r"(?i)ruptured\s+aneurysm",
        ],
        indirect_patterns: &[r"(?i)\bvasospasm\b", r"(?i)xanthochromia"],
        symptom_patterns: &[
            r"(?i)thunderclap\s+headache",
            r"(?i)worst\s+headache\s+of\s+(her|his|their)\s+life",
            r"(?i)\bnuchal\s+rigidity\b",
            r"(?i)\bphotophobia\b",
        ],
        procedure_patterns: &[
            r"(?i)aneurysm\s+clipping",
            r"(?i)coil(ing)?\s+embolization",
            r"(?i)endovascular\s+coiling",
            r"(?i)external\s+ventricular\s+drain",
            r"(?i)\bevd\b\s+placement",
            r"(?i)craniotom(y|ies)\s+for\s+.*aneurysm",
        ],
        complication_patterns: &[
            r"(?i)\bvasospasm\b",
            r"(?i)\brebleed(ing)?\b",
            r"(?i)delayed\s+cerebral\s+ischemia",
            r"(?i)hydrocephalus",
            r"(?i)\bhyponatremia\b",
        ],
        grading_scales: &[
            GradingScale { name: "Hunt-Hess", pattern: r"(?i)hunt[\s-]?hess\s*(?:grade|score)?\s*#?\s*(\d)" },
            GradingScale { name: "Fisher", pattern: r"(?i)(?:modified\s+)?fisher\s*(?:grade|score)?\s*#?\s*(\d)" },
            GradingScale { name: "WFNS", pattern: r"(?i)wfns\s*(?:grade|score)?\s*#?\s*(\d)" },
        ],
    },
    PathologyProfile {
        pathology_type: PathologyType::TbiCsdh,
        display_name: "traumatic brain injury / chronic subdural hematoma",
        detection_patterns: &[
            r"(?i)traumatic\s+brain\s+injury",
            r"(?i)\btbi\b",
            r"(?i)chronic\s+subdural\s+hemat",
            r"(?i)\bcsdh\b",
            r"(?i)subdural\s+hematoma",
        ],
        indirect_patterns: &[r"(?i)\bfall\b.*\bhead\b", r"(?i)loss\s+of\s+consciousness"],
        symptom_patterns: &[
            r"(?i)\bconfusion\b",
            r"(?i)\bgait\s+instability\b",
            r"(?i)\bheadache\b",
        ],
        procedure_patterns: &[
            r"(?i)burr\s+hole\s+(evacuation|drainage)?",
            r"(?i)craniotomy\s+for\s+(evacuation|hematoma)",
            r"(?i)decompressive\s+craniectomy",
        ],
        complication_patterns: &[
            r"(?i)re-?accumulation",
            r"(?i)seizure",
            r"(?i)midline\s+shift",
        ],
        grading_scales: &[
            GradingScale { name: "GCS", pattern: r"(?i)\bgcs\s*#?\s*(\d{1,2})" },
        ],
    },
    PathologyProfile {
        pathology_type: PathologyType::Ich,
        display_name: "intracerebral hemorrhage",
        detection_patterns: &[
            r"(?i)intracerebral\s+hemorrhage",
            r"(?i)\bich\b",
            r"(?i)intraparenchymal\s+hemorrhage",
        ],
        indirect_patterns: &[r"(?i)hypertensive\s+hemorrhage"],
        symptom_patterns: &[r"(?i)hemiparesis", r"(?i)aphasia", r"(?i)sudden\s+weakness"],
        procedure_patterns: &[
            r"(?i)hematoma\s+evacuation",
            r"(?i)stereotactic\s+aspiration",
            r"(?i)decompressive\s+hemicraniectomy",
        ],
        complication_patterns: &[r"(?i)hematoma\s+expansion", r"(?i)intraventricular\s+extension"],
        grading_scales: &[
            GradingScale { name: "ICH Score", pattern: r"(?i)ich\s+score\s*#?\s*(\d)" },
        ],
    },
    PathologyProfile {
        pathology_type: PathologyType::Tumors,
        display_name: "brain tumor",
        detection_patterns: &[
            r"(?i)\bglioblastoma\b",
            r"(?i)\bmeningioma\b",
            r"(?i)\bastrocytoma\b",
            r"(?i)brain\s+tumor",
            r"(?i)intracranial\s+mass",
        ],
        indirect_patterns: &[r"(?i)new\s+onset\s+seizure", r"(?i)progressive\s+headache"],
        symptom_patterns: &[r"(?i)visual\s+field\s+deficit", r"(?i)cognitive\s+decline"],
        procedure_patterns: &[
            r"(?i)craniotomy\s+for\s+(tumor|mass)\s+resection",
            r"(?i)awake\s+craniotomy",
            r"(?i)stereotactic\s+biopsy",
        ],
        complication_patterns: &[r"(?i)cerebral\s+edema", r"(?i)wound\s+dehiscence"],
        grading_scales: &[
            GradingScale { name: "WHO Grade", pattern: r"(?i)who\s+grade\s*#?\s*(i{1,3}v?|iv|\d)" },
        ],
    },
    PathologyProfile {
        pathology_type: PathologyType::Metastases,
        display_name: "brain metastases",
        detection_patterns: &[
            r"(?i)brain\s+metasta",
            r"(?i)metastatic\s+(lesion|disease)\s+to\s+the\s+brain",
        ],
        indirect_patterns: &[r"(?i)known\s+(lung|breast|melanoma)\s+(cancer|carcinoma)"],
        symptom_patterns: &[r"(?i)ataxia", r"(?i)diplopia"],
        procedure_patterns: &[
            r"(?i)stereotactic\s+radiosurgery",
            r"(?i)craniotomy\s+for\s+metastasect",
        ],
        complication_patterns: &[r"(?i)radiation\s+necrosis", r"(?i)leptomeningeal\s+spread"],
        grading_scales: &[],
    },
    PathologyProfile {
        pathology_type: PathologyType::Spine,
        display_name: "spinal pathology",
        detection_patterns: &[
            r"(?i)spinal\s+stenosis",
            r"(?i)disc\s+herniation",
            r"(?i)cauda\s+equina",
            r"(?i)spondylolisthesis",
        ],
        indirect_patterns: &[r"(?i)radiculopathy", r"(?i)myelopathy"],
        symptom_patterns: &[r"(?i)lower\s+extremity\s+weakness", r"(?i)saddle\s+anesthesia"],
        procedure_patterns: &[
            r"(?i)laminectomy",
            r"(?i)discectomy",
            r"(?i)spinal\s+fusion",
            r"(?i)posterior\s+instrumentation",
        ],
        complication_patterns: &[r"(?i)dural\s+tear", r"(?i)hardware\s+failure", r"(?i)csf\s+leak"],
        grading_scales: &[
            GradingScale { name: "ASIA", pattern: r"(?i)asia\s*(?:grade|scale)?\s*([a-e])" },
        ],
    },
    PathologyProfile {
        pathology_type: PathologyType::Hydrocephalus,
        display_name: "hydrocephalus",
        detection_patterns: &[
            r"(?i)\bhydrocephalus\b",
            r"(?i)ventriculomegaly",
        ],
        indirect_patterns: &[r"(?i)enlarged\s+ventricles", r"(?i)gait\s+apraxia"],
        symptom_patterns: &[r"(?i)urinary\s+incontinence", r"(?i)memory\s+impairment"],
        procedure_patterns: &[
            r"(?i)ventriculoperitoneal\s+shunt",
            r"(?i)\bvp\s+shunt\b",
            r"(?i)endoscopic\s+third\s+ventriculostomy",
            r"(?i)\betv\b",
        ],
        complication_patterns: &[r"(?i)shunt\s+malfunction", r"(?i)shunt\s+infection"],
        grading_scales: &[],
    },
];

pub fn profile_for(pathology_type: PathologyType) -> &'static PathologyProfile {
    CATALOGUE
        .iter()
        .find(|p| p.pathology_type == pathology_type)
        .expect("catalogue declares a profile for every PathologyType variant")
}
