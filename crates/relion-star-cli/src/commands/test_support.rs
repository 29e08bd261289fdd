use crate::config::AppConfig;
use relion_star::core::io::parser::ParseOptions;
use relion_star::core::io::writer::WriteOptions;
use relion_star::workflows::defocus::DefocusGroupConfig;

pub const RUN_DATA: &str = "\
# version 30001

data_optics

loop_
_rlnOpticsGroupName #1
_rlnOpticsGroup #2
_rlnVoltage #3
_rlnImagePixelSize #4
opticsGroup1 1 300.000000 1.060000

# version 30001

data_particles

loop_
_rlnImageName #1
_rlnDefocusU #2
_rlnDefocusV #3
_rlnClassNumber #4
_rlnOpticsGroup #5
_rlnLogLikelihood #6
000001@Extract/job007/mic_001.mrcs 10863.857422 10575.339844 1 1 10234.500000
000002@Extract/job007/mic_001.mrcs 10863.857422 10575.339844 2 1 10450.250000
000001@Extract/job007/mic_002.mrcs 15290.119141 15002.763672 2 1 10120.000000
000002@Extract/job007/mic_002.mrcs 15290.119141 15002.763672 1 1 10388.750000
";

pub fn app_config() -> AppConfig {
    AppConfig {
        parse: ParseOptions::relion(),
        write: WriteOptions::default(),
        defocus: DefocusGroupConfig::default(),
    }
}
