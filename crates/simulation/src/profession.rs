//! Static profession table.
//!
//! Every job a citizen can hold, with the education it requires, the monthly
//! salary it pays and the kind of workplace it belongs to. Workplace kinds are
//! kebab-case names; the ones that match a [`BuildingType`] are hireable today,
//! the rest (courthouse, bank, ...) are listed for completeness.

use crate::buildings::BuildingType;

/// Minimum age for any listed profession.
pub const PROFESSION_MIN_AGE: u32 = 18;
/// Age at which citizens stop qualifying.
pub const PROFESSION_MAX_AGE: u32 = 65;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profession {
    /// Stable identifier used in save files.
    pub key: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub education_required: f32,
    pub base_salary: f64,
    /// Kebab-case workplace kind, e.g. `"police-station"`.
    pub workplace: &'static str,
}

const fn profession(
    key: &'static str,
    name: &'static str,
    category: &'static str,
    education_required: f32,
    base_salary: f64,
    workplace: &'static str,
) -> Profession {
    Profession {
        key,
        name,
        category,
        education_required,
        base_salary,
        workplace,
    }
}

impl Profession {
    pub fn is_qualified(&self, education: f32, age: u32) -> bool {
        education >= self.education_required
            && (PROFESSION_MIN_AGE..PROFESSION_MAX_AGE).contains(&age)
    }

    pub fn works_at(&self, building_type: BuildingType) -> bool {
        self.workplace == building_type.as_str()
    }
}

pub static PROFESSIONS: &[Profession] = &[
    profession("policeOfficer", "Police Officer", "Law Enforcement", 40.0, 4500.0, "police-station"),
    profession("detective", "Detective", "Law Enforcement", 60.0, 6500.0, "police-station"),
    profession("sheriff", "Sheriff", "Law Enforcement", 50.0, 5500.0, "police-station"),
    profession("lawyer", "Lawyer", "Legal", 90.0, 12000.0, "courthouse"),
    profession("judge", "Judge", "Legal", 95.0, 15000.0, "courthouse"),
    profession("paralegal", "Paralegal", "Legal", 65.0, 5000.0, "courthouse"),
    profession("firefighter", "Firefighter", "Emergency", 35.0, 5000.0, "fire-station"),
    profession("paramedic", "Paramedic", "Emergency", 70.0, 5500.0, "hospital"),
    profession("emergencyDispatcher", "Emergency Dispatcher", "Emergency", 30.0, 3800.0, "fire-station"),
    profession("urbanPlanner", "Urban Planner", "Government", 85.0, 7500.0, "city-hall"),
    profession("policyAnalyst", "Policy Analyst", "Government", 80.0, 7000.0, "city-hall"),
    profession("socialWorker", "Social Worker", "Government", 75.0, 5000.0, "city-hall"),
    profession("doctor", "Doctor", "Healthcare", 95.0, 18000.0, "hospital"),
    profession("surgeon", "Surgeon", "Healthcare", 98.0, 25000.0, "hospital"),
    profession("nurse", "Nurse", "Healthcare", 65.0, 6500.0, "hospital"),
    profession("dentist", "Dentist", "Healthcare", 90.0, 15000.0, "dental-clinic"),
    profession("pharmacist", "Pharmacist", "Healthcare", 85.0, 11000.0, "pharmacy"),
    profession("physiotherapist", "Physiotherapist", "Healthcare", 80.0, 7500.0, "clinic"),
    profession("psychologist", "Psychologist", "Healthcare", 90.0, 9000.0, "clinic"),
    profession("nutritionist", "Nutritionist", "Healthcare", 75.0, 6000.0, "clinic"),
    profession("clinicalLabTech", "Clinical Lab Technician", "Medical Lab", 70.0, 5500.0, "medical-lab"),
    profession("pathologist", "Pathologist", "Medical Lab", 95.0, 16000.0, "medical-lab"),
    profession("microbiologist", "Microbiologist", "Medical Lab", 85.0, 8500.0, "medical-lab"),
    profession("radiologist", "Radiologist", "Medical Lab", 90.0, 20000.0, "hospital"),
    profession("carpenter", "Carpenter", "Trades", 25.0, 4500.0, "industrial"),
    profession("electrician", "Electrician", "Trades", 35.0, 5500.0, "industrial"),
    profession("plumber", "Plumber", "Trades", 30.0, 5000.0, "industrial"),
    profession("welder", "Welder", "Trades", 35.0, 4800.0, "industrial"),
    profession("mason", "Mason", "Trades", 20.0, 4200.0, "industrial"),
    profession("civilEngineer", "Civil Engineer", "Engineering", 85.0, 9500.0, "office"),
    profession("architect", "Architect", "Engineering", 90.0, 11000.0, "office"),
    profession("surveyor", "Surveyor", "Engineering", 60.0, 6500.0, "office"),
    profession("metallurgist", "Metallurgist", "Industrial Lab", 80.0, 8000.0, "research-lab"),
    profession("materialsEngineer", "Materials Engineer", "Industrial Lab", 85.0, 8500.0, "research-lab"),
    profession("calibrationTech", "Calibration Technician", "Industrial Lab", 55.0, 5000.0, "research-lab"),
    profession("softwareDeveloper", "Software Developer", "Technology", 75.0, 10000.0, "tech-office"),
    profession("dataScientist", "Data Scientist", "Technology", 85.0, 12000.0, "tech-office"),
    profession("cyberSecurityAnalyst", "Cybersecurity Analyst", "Technology", 80.0, 11000.0, "tech-office"),
    profession("uxDesigner", "UX Designer", "Technology", 70.0, 8500.0, "tech-office"),
    profession("aiEngineer", "AI Engineer", "Technology", 90.0, 15000.0, "tech-office"),
    profession("biologist", "Biologist", "Science", 85.0, 7500.0, "research-lab"),
    profession("chemist", "Chemist", "Science", 85.0, 8000.0, "research-lab"),
    profession("physicist", "Physicist", "Science", 90.0, 9500.0, "research-lab"),
    profession("astronomer", "Astronomer", "Science", 90.0, 9000.0, "observatory"),
    profession("geologist", "Geologist", "Science", 80.0, 7500.0, "research-lab"),
    profession("researchScientist", "Research Scientist", "R&D", 90.0, 11000.0, "research-lab"),
    profession("labTechnician", "Lab Technician", "R&D", 60.0, 5500.0, "research-lab"),
    profession("cleanroomTech", "Cleanroom Technician", "R&D", 65.0, 6500.0, "tech-factory"),
    profession("banker", "Banker", "Finance", 75.0, 8500.0, "bank"),
    profession("accountant", "Accountant", "Finance", 70.0, 7000.0, "office"),
    profession("stockbroker", "Stockbroker", "Finance", 80.0, 12000.0, "bank"),
    profession("financialAdvisor", "Financial Advisor", "Finance", 75.0, 9000.0, "bank"),
    profession("auditor", "Auditor", "Finance", 75.0, 8000.0, "office"),
    profession("ceo", "CEO", "Management", 95.0, 30000.0, "office"),
    profession("hrManager", "HR Manager", "Management", 70.0, 7500.0, "office"),
    profession("marketingDirector", "Marketing Director", "Management", 80.0, 10000.0, "office"),
    profession("projectManager", "Project Manager", "Management", 75.0, 9000.0, "office"),
    profession("prSpecialist", "PR Specialist", "Management", 65.0, 6500.0, "office"),
    profession("realEstateAgent", "Real Estate Agent", "Real Estate", 50.0, 7000.0, "commercial"),
    profession("propertyManager", "Property Manager", "Real Estate", 60.0, 6000.0, "commercial"),
    profession("artist", "Artist", "Arts", 40.0, 4000.0, "commercial"),
    profession("musician", "Musician", "Arts", 35.0, 3500.0, "commercial"),
    profession("graphicDesigner", "Graphic Designer", "Arts", 60.0, 6000.0, "office"),
    profession("photographer", "Photographer", "Arts", 40.0, 5000.0, "commercial"),
    profession("chef", "Chef", "Food Service", 45.0, 5500.0, "commercial"),
    profession("barista", "Barista", "Food Service", 10.0, 2500.0, "commercial"),
    profession("hotelManager", "Hotel Manager", "Hospitality", 65.0, 7000.0, "commercial"),
    profession("teacher", "Teacher", "Education", 80.0, 5500.0, "school"),
    profession("professor", "Professor", "Education", 95.0, 9000.0, "university"),
    profession("librarian", "Librarian", "Education", 70.0, 4500.0, "school"),
    profession("forensicScientist", "Forensic Scientist", "Forensics", 85.0, 8500.0, "forensic-lab"),
    profession("ballisticsExpert", "Ballistics Expert", "Forensics", 80.0, 9000.0, "forensic-lab"),
    profession("ecologist", "Ecologist", "Environmental", 80.0, 7000.0, "environmental-lab"),
    profession("toxicologist", "Toxicologist", "Environmental", 85.0, 8500.0, "environmental-lab"),
    profession("cashier", "Cashier", "Retail", 10.0, 2200.0, "commercial"),
    profession("salesAssociate", "Sales Associate", "Retail", 15.0, 2800.0, "commercial"),
    profession("warehouseWorker", "Warehouse Worker", "Labor", 10.0, 3000.0, "industrial"),
    profession("janitor", "Janitor", "Labor", 5.0, 2400.0, "commercial"),
    profession("securityGuard", "Security Guard", "Security", 20.0, 3200.0, "commercial"),
];

/// Look up a profession by its save key (`"doctor"`) or display name (`"Doctor"`).
pub fn by_name(name: &str) -> Option<&'static Profession> {
    PROFESSIONS
        .iter()
        .find(|p| p.key == name || p.name == name)
}

pub fn by_category(category: &str) -> Vec<&'static Profession> {
    PROFESSIONS.iter().filter(|p| p.category == category).collect()
}

pub fn by_building(workplace: &str) -> Vec<&'static Profession> {
    PROFESSIONS.iter().filter(|p| p.workplace == workplace).collect()
}

/// Professions open to a citizen with this education and age, in table order.
pub fn qualified_for(education: f32, age: u32) -> Vec<&'static Profession> {
    PROFESSIONS
        .iter()
        .filter(|p| p.is_qualified(education, age))
        .collect()
}

/// Highest-paying profession in `candidates` that fits `building_type`.
///
/// Commercial and industrial workplaces also take the generic commercial and
/// industrial trades; service buildings only take their own staff.
pub fn best_for_workplace(
    candidates: &[&'static Profession],
    building_type: BuildingType,
) -> Option<&'static Profession> {
    let generic = building_type.is_zone() && building_type != BuildingType::Residential;
    candidates
        .iter()
        .copied()
        .filter(|p| {
            p.works_at(building_type)
                || (generic
                    && (p.works_at(BuildingType::Commercial)
                        || p.works_at(BuildingType::Industrial)))
        })
        .fold(None, |best: Option<&'static Profession>, p| match best {
            Some(b) if b.base_salary >= p.base_salary => Some(b),
            _ => Some(p),
        })
}
