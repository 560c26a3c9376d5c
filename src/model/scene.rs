use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::component::ComponentRecord;

/// A named development setup and the components it recommends.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub key: &'static str,
    pub title: &'static str,
    pub highlights: &'static str,
    /// `(component name, short description)`
    pub components: &'static [(&'static str, &'static str)],
}

pub const SCENES: &[Scene] = &[
    Scene {
        key: "web-development",
        title: "Web Development",
        highlights: "Nginx, PHP, Java, MySQL, Redis, Node.js",
        components: &[
            ("nginx", "High-performance web server"),
            ("php", "Server-side scripting language"),
            ("java", "Java runtime and compiler"),
            ("mysql", "Relational database"),
            ("redis", "In-memory data store"),
            ("nodejs", "JavaScript runtime"),
        ],
    },
    Scene {
        key: "embedded",
        title: "Embedded Systems",
        highlights: "ARM/RISC-V GCC, OpenOCD, GDB",
        components: &[
            ("gcc-arm", "ARM cross compiler"),
            ("openocd", "On-chip debugger"),
            ("gdb", "GNU debugger"),
            ("minicom", "Serial terminal"),
            ("i2c-tools", "I2C bus utilities"),
            ("spi-tools", "SPI bus utilities"),
        ],
    },
    Scene {
        key: "robotics",
        title: "Robotics",
        highlights: "ROS2, MoveIt2, Gazebo, OpenCV",
        components: &[
            ("ros2", "Robot Operating System 2"),
            ("opencv", "Computer vision library"),
            ("gazebo", "3D robot simulator"),
            ("moveit2", "Motion planning framework"),
        ],
    },
    Scene {
        key: "ai-ml",
        title: "AI/ML Development",
        highlights: "Python, Jupyter, TensorFlow, PyTorch",
        components: &[
            ("python", "Python interpreter"),
            ("jupyter", "Interactive notebooks"),
            ("tensorflow", "Machine learning framework"),
            ("pytorch", "Deep learning framework"),
            ("opencv", "Computer vision library"),
        ],
    },
    Scene {
        key: "game-dev",
        title: "Game Development",
        highlights: "SDL2, OpenGL, Vulkan, Godot",
        components: &[
            ("sdl2", "Multimedia layer"),
            ("opengl", "Graphics API"),
            ("vulkan", "Low-overhead graphics API"),
            ("godot", "Game engine"),
        ],
    },
    Scene {
        key: "devops",
        title: "DevOps",
        highlights: "Docker, Kubernetes, Jenkins, Prometheus",
        components: &[
            ("docker", "Container runtime"),
            ("kubernetes", "Container orchestration"),
            ("jenkins", "CI server"),
            ("prometheus", "Metrics and alerting"),
            ("grafana", "Dashboards"),
        ],
    },
    Scene {
        key: "security",
        title: "Security",
        highlights: "Nmap, Wireshark, Metasploit",
        components: &[
            ("nmap", "Network scanner"),
            ("wireshark", "Packet analyzer"),
            ("metasploit", "Penetration testing framework"),
        ],
    },
    Scene {
        key: "blockchain",
        title: "Blockchain Development",
        highlights: "Hardhat, Solidity, Web3.js",
        components: &[
            ("hardhat", "Ethereum development environment"),
            ("web3js", "Ethereum JavaScript API"),
            ("solidity", "Smart contract compiler"),
            ("ipfs", "Content-addressed storage"),
        ],
    },
    Scene {
        key: "iot",
        title: "IoT Development",
        highlights: "Mosquitto, Node-RED, InfluxDB",
        components: &[
            ("mosquitto", "MQTT broker"),
            ("node-red", "Flow-based wiring tool"),
            ("influxdb", "Time series database"),
            ("grafana", "Dashboards"),
        ],
    },
];

pub fn find(key: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|scene| scene.key == key)
}

/// Closest scene key for a mistyped name.
pub fn suggest(input: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    SCENES
        .iter()
        .filter_map(|scene| {
            matcher
                .fuzzy_match(scene.key, input)
                .map(|score| (score, scene.key))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, key)| key)
}

impl Scene {
    /// Recommended components as (not yet installed) records.
    pub fn recommendations(&self) -> Vec<ComponentRecord> {
        self.components
            .iter()
            .map(|(name, description)| ComponentRecord::new(*name, *description))
            .collect()
    }
}
