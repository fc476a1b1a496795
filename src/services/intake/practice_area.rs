/// Keyword groups, checked in order; the first group with any hit wins
const PRACTICE_AREAS: &[(&str, &[&str])] = &[
    (
        "Personal Injury",
        &[
            "personal injury", "accident", "injury", "hurt", "slip and fall", "car accident",
            "auto accident", "motor vehicle", "medical malpractice", "wrongful death",
            "premises liability", "product liability", "dog bite", "bicycle accident",
            "motorcycle accident", "pedestrian accident", "nursing home abuse",
            "construction accident", "workplace injury",
        ],
    ),
    (
        "Family Law",
        &[
            "divorce", "custody", "child support", "alimony", "spousal support", "marriage",
            "separation", "adoption", "family", "spouse", "prenup", "prenuptial",
            "domestic violence", "restraining order", "paternity", "visitation", "guardianship",
            "child custody", "domestic relations",
        ],
    ),
    (
        "Criminal Law",
        &[
            "criminal", "arrest", "arrested", "charge", "charged", "offense", "crime", "dui", "dwi",
            "owi", "theft", "assault", "battery", "probation", "jail", "prison", "felony",
            "misdemeanor", "warrant", "drug", "trafficking", "possession", "domestic violence",
            "fraud", "embezzlement", "burglary", "robbery", "homicide", "manslaughter",
        ],
    ),
    (
        "Estate Planning",
        &[
            "estate", "will", "trust", "inheritance", "probate", "executor", "beneficiary", "death",
            "asset", "living will", "power of attorney", "estate planning", "succession", "heir",
            "testamentary", "guardian", "conservatorship", "elder law", "medicaid planning",
        ],
    ),
    (
        "Real Estate",
        &[
            "real estate", "property", "house", "home", "closing", "deed", "title", "mortgage",
            "foreclosure", "landlord", "tenant", "lease", "eviction", "zoning", "easement",
            "boundary", "construction", "homeowners association", "hoa", "purchase agreement",
        ],
    ),
    (
        "Business Law",
        &[
            "business", "contract", "llc", "corporation", "partnership", "employment", "fired",
            "wrongful termination", "discrimination", "harassment", "wage", "overtime",
            "breach of contract", "lawsuit", "commercial", "intellectual property", "trademark",
            "copyright", "non-compete", "partnership dispute", "shareholder",
        ],
    ),
    (
        "Immigration",
        &[
            "immigration", "visa", "green card", "citizenship", "deportation", "asylum", "refugee",
            "work permit", "naturalization", "ice", "immigration court", "removal proceedings",
            "family petition",
        ],
    ),
    (
        "Bankruptcy",
        &[
            "bankruptcy", "chapter 7", "chapter 13", "debt", "foreclosure", "creditor", "discharge",
            "filing bankruptcy", "debt relief",
        ],
    ),
    (
        "Social Security Disability",
        &[
            "disability", "social security", "ssdi", "ssi", "disabled", "disability benefits",
            "social security disability",
        ],
    ),
    (
        "Workers' Compensation",
        &[
            "workers compensation", "workers comp", "work injury", "on the job injury",
            "workplace accident", "injured at work",
        ],
    ),
    (
        "Civil Rights",
        &[
            "civil rights", "discrimination", "police brutality", "excessive force",
            "constitutional rights", "section 1983", "civil lawsuit",
        ],
    ),
    (
        "Tax Law",
        &[
            "tax", "irs", "tax debt", "tax lien", "tax levy", "audit", "tax resolution",
            "offer in compromise", "innocent spouse",
        ],
    ),
];

/// Practice area for a case description. Keywords match as substrings.
pub fn extract_practice_area(description: &str) -> &'static str {
    if description.trim().is_empty() {
        return "Other";
    }
    let lower = description.to_lowercase();
    PRACTICE_AREAS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(area, _)| *area)
        .unwrap_or("General")
}
